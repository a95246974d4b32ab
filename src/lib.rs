//! This library implements the control loop of Bayesian Optimization:
//! sequential, sample-efficient minimization of an expensive-to-evaluate
//! black-box function using a probabilistic surrogate model and an
//! acquisition criterion trading exploration against exploitation.
//!
//! The optimizer owns the growing evaluation history and, at each
//! iteration:
//! * refits the surrogate hyperparameters with a best-of-N multistart
//!   strategy robust to local optima,
//! * optionally draws hyperparameter samples from the posterior for
//!   inspection,
//! * proposes a candidate batch by minimizing the acquisition criterion
//!   from several random starting batches with a local nonlinear solver,
//! * evaluates the objective there and appends the outcome to the history.
//!
//! The surrogate model itself is a collaborator: any Gaussian-process-like
//! regressor implementing [`SurrogateModel`] (and built through a
//! [`SurrogateBuilder`]) can be driven. The objective function evaluates a
//! whole batch at once and may return auxiliary output columns recorded in
//! the history along the objective value.
//!
//! # Example
//!
//! ```no_run
//! use bayesopt::{AcqSolver, BoBuilder, KernelSpec, MeanSpec, ParamSamples, Result,
//!                SurrogateBuilder, SurrogateModel};
//! use ndarray::{array, Array1, Array2, ArrayView1, ArrayView2};
//! use rand_xoshiro::Xoshiro256Plus;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Clone)]
//! # struct Gp { xt: Array2<f64>, yt: Array1<f64>, theta: Array1<f64> }
//! # impl SurrogateModel for Gp {
//! #     fn set_training_data(&mut self, xt: &ArrayView2<f64>, yt: &ArrayView1<f64>) -> Result<()> {
//! #         self.xt = xt.to_owned(); self.yt = yt.to_owned(); Ok(())
//! #     }
//! #     fn acquisition(&self, x: &ArrayView2<f64>) -> Result<(f64, Array2<f64>)> {
//! #         Ok((0., Array2::zeros(x.raw_dim())))
//! #     }
//! #     fn prepare_fit(&mut self) -> Result<()> { Ok(()) }
//! #     fn fit_objective(&self, p: &ArrayView1<f64>) -> Result<f64> { Ok(p[0] * p[0]) }
//! #     fn params(&self) -> Array1<f64> { self.theta.clone() }
//! #     fn set_params(&mut self, p: &ArrayView1<f64>) { self.theta = p.to_owned(); }
//! #     fn randomize_params(&mut self, _rng: &mut Xoshiro256Plus) {}
//! #     fn optimize_params(&mut self) -> Result<()> { Ok(()) }
//! #     fn sample_posterior(&self, n: usize, _rng: &mut Xoshiro256Plus) -> Result<ParamSamples> {
//! #         Ok(ParamSamples { names: vec!["theta".into()], values: Array2::zeros((n, 1)) })
//! #     }
//! # }
//! # #[derive(Clone, Serialize, Deserialize)]
//! # struct GpBuilder;
//! # impl SurrogateBuilder for GpBuilder {
//! #     fn set_kernel_spec(&mut self, _kernel: KernelSpec) {}
//! #     fn set_mean_spec(&mut self, _mean: Option<MeanSpec>) {}
//! #     fn set_fixed_noise(&mut self, _variance: Option<f64>) {}
//! #     fn build(&self, xlimits: &ArrayView2<f64>) -> Result<Box<dyn SurrogateModel>> {
//! #         Ok(Box::new(Gp { xt: Array2::zeros((0, xlimits.nrows())), yt: Array1::zeros(0), theta: array![1.0] }))
//! #     }
//! # }
//!
//! // A one-dimensional test function, x in [0., 25.] and min xsinx(x) ~ -15.1 at x ~ 18.9
//! fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
//!     (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())
//! }
//!
//! // GpBuilder is any surrogate builder implementing `SurrogateBuilder`
//! let bo = BoBuilder::optimize(xsinx)
//!     .surrogate(GpBuilder)
//!     .configure(|config| {
//!         config
//!             .iterations(10)
//!             .initial_size(3)
//!             .model_restarts(10)
//!             .opt_restarts(20)
//!             .nl_solver(AcqSolver::Slsqp)
//!     })
//!     .min_within(&array![[0.0, 25.0]])
//!     .expect("optimizer configured");
//! let res = bo.run(42).expect("xsinx minimized");
//! println!("Minimum found f(x) = {} at x = {}", res.y_opt, res.x_opt);
//! ```
//!
//! # Usage
//!
//! The [`BoBuilder`] class is used to assemble the optimizer from the
//! objective function, a surrogate builder and a design space given as a
//! (nx, 2) matrix of [lower bound, upper bound] rows. [`Bo::run`] then
//! plays the whole loop for a given random seed: one seed determines the
//! initial batch, every hyperparameter randomization and every acquisition
//! restart, so runs are reproducible end to end.
//!
//! Some of the most useful options are:
//!
//! * The size of the initial random batch (when 0, a size is derived from
//!   the input dimension):
//!
//! ```no_run
//! # use bayesopt::BoConfig;
//! # let config = BoConfig::default();
//!     config.initial_size(10);
//! ```
//!
//! * The number of points proposed per iteration; the batch is optimized
//!   jointly so batch-aware acquisition criteria can keep its points apart:
//!
//! ```no_run
//! # use bayesopt::BoConfig;
//! # let config = BoConfig::default();
//!     config.batch_size(4);
//! ```
//!
//! * The restart counts of the two multistart optimizations, trading run
//!   time against robustness to local optima:
//!
//! ```no_run
//! # use bayesopt::BoConfig;
//! # let config = BoConfig::default();
//!     config.model_restarts(20).opt_restarts(40);
//! ```
//!
//! * A known observation noise variance, held constant during fitting:
//!
//! ```no_run
//! # use bayesopt::BoConfig;
//! # let config = BoConfig::default();
//!     config.noise(1e-6);
//! ```
//!
//! # Implementation notes
//!
//! * The loop is implemented as an [`argmin::core::Solver`] run by the
//!   argmin executor, which also provides the Ctrl-C handling: an interrupt
//!   stops the run between iterations and surfaces as a cancellation, never
//!   as a generic failure.
//! * Observed objective values are rescaled to zero mean and unit variance
//!   before surrogate fitting (unless disabled or degenerate); auxiliary
//!   output columns are recorded but never fed to the surrogate.
//! * Acquisition restarts run in parallel; the retained candidate is the
//!   strictly smallest value, ties going to the earliest restart, so the
//!   reduction is deterministic for a given seed.
//! * A restart whose local solve fails is discarded with a diagnostic; the
//!   run only aborts when an iteration produces no candidate at all.
//!
//! # References
//!
//! Jones, D. R., Schonlau, M., & Welch, W. J. (1998). Efficient global
//! optimization of expensive black-box functions. Journal of Global
//! Optimization, 13(4), 455–492.
//!
//! Snoek, J., Larochelle, H., & Adams, R. P. (2012). Practical Bayesian
//! optimization of machine learning algorithms. Advances in Neural
//! Information Processing Systems 25.
//!
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

mod bo;
mod errors;
mod normalization;
mod optimizers;
mod sampling;
mod solver;
mod surrogate;
mod types;
mod utils;

pub use crate::bo::*;
pub use crate::errors::*;
pub use crate::normalization::*;
pub use crate::sampling::*;
pub use crate::solver::*;
pub use crate::surrogate::*;
pub use crate::types::*;
pub use crate::utils::*;
