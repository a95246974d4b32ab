//! Surrogate model abstraction used by the optimizer.
//!
//! The optimizer does not implement Gaussian process regression itself; it
//! drives any probabilistic regressor exposing the capabilities below:
//! training-data slots, an acquisition criterion with its gradient, a
//! fitting objective with local-optimizer hooks for the model's own
//! hyperparameters, and posterior hyperparameter sampling.

use crate::errors::Result;
use dyn_clonable::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};

/// Correlation kernel specification for the surrogate model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelSpec {
    /// Squared exponential correlation model
    SquaredExponential,
    /// Absolute exponential correlation model
    AbsoluteExponential,
    /// Matern 3/2 correlation model
    Matern32,
    /// Matern 5/2 correlation model
    Matern52,
}

/// Mean (trend) function specification for the surrogate model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeanSpec {
    /// Constant mean function
    Constant,
    /// Linear mean function
    Linear,
    /// Quadratic mean function
    Quadratic,
}

/// A structured set of hyperparameter samples drawn from the posterior.
///
/// Rows are samples, columns are hyperparameters named by `names`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamSamples {
    /// Hyperparameter names, one per column of `values`
    pub names: Vec<String>,
    /// Sample values as a (n_samples, n_params) matrix
    pub values: Array2<f64>,
}

/// A trait for surrogate models of the objective function.
///
/// Implementations are expected to be Gaussian-process-like regressors: the
/// optimizer feeds them the (normalized) observations gathered so far, asks
/// them to refit their hyperparameters through the hooks below, and
/// minimizes their acquisition criterion to select the next evaluation
/// batch.
#[clonable]
pub trait SurrogateModel: Clone + Send + Sync {
    /// Replace the training data with inputs `xt` and (normalized) targets `yt`
    fn set_training_data(&mut self, xt: &ArrayView2<f64>, yt: &ArrayView1<f64>) -> Result<()>;

    /// Acquisition criterion value and gradient at a candidate batch.
    ///
    /// `x` is a (batch_size, nx) matrix; the returned gradient has the same
    /// shape. The value is the quantity to *minimize*: implementations
    /// typically return a negated improvement-based criterion. Criteria may
    /// couple the points of the batch, e.g. to penalize near-duplicates.
    fn acquisition(&self, x: &ArrayView2<f64>) -> Result<(f64, Array2<f64>)>;

    /// Make the fitting objective evaluable.
    ///
    /// Called exactly once before a sequence of fitting restarts. Must be
    /// idempotent: a model that is already prepared returns immediately.
    fn prepare_fit(&mut self) -> Result<()>;

    /// Fitting objective (e.g. negative log marginal likelihood) at `params`
    fn fit_objective(&self, params: &ArrayView1<f64>) -> Result<f64>;

    /// Current hyperparameter vector
    fn params(&self) -> Array1<f64>;

    /// Overwrite the hyperparameter vector
    fn set_params(&mut self, params: &ArrayView1<f64>);

    /// Draw a fresh random hyperparameter vector within valid ranges
    fn randomize_params(&mut self, rng: &mut Xoshiro256Plus);

    /// Run the model's own local optimizer on the fitting objective,
    /// starting from the current hyperparameters
    fn optimize_params(&mut self) -> Result<()>;

    /// Draw `n_samples` hyperparameter samples from the posterior
    fn sample_posterior(&self, n_samples: usize, rng: &mut Xoshiro256Plus)
        -> Result<ParamSamples>;
}

/// A trait for surrogate model construction.
///
/// A builder is configured from [`crate::BoConfig`] specifications then
/// asked to produce the model trained along the run.
pub trait SurrogateBuilder: Clone + Serialize + Sync {
    /// Sets the correlation kernel used by the model
    fn set_kernel_spec(&mut self, kernel: KernelSpec);

    /// Sets the mean function used by the model; `None` means zero mean
    fn set_mean_spec(&mut self, mean: Option<MeanSpec>);

    /// Fix the observation noise variance to a known value.
    ///
    /// A provided variance is held constant and excluded from fitting;
    /// `None` lets the model fit its own noise level.
    fn set_fixed_noise(&mut self, variance: Option<f64>);

    /// Build a surrogate model for the given (nx, 2) design space bounds
    fn build(&self, xlimits: &ArrayView2<f64>) -> Result<Box<dyn SurrogateModel>>;
}
