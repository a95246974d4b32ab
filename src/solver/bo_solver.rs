//! Bayesian optimization implemented as an [argmin::core::Solver] to benefit
//! from features coming with the argmin framework such as observers or the
//! Ctrl-C handler which stops a run between iterations.
//!
//! Each iteration refits the surrogate hyperparameters on the data gathered
//! so far, optionally draws posterior hyperparameter samples for inspection,
//! proposes a candidate batch by minimizing the acquisition criterion and
//! evaluates the objective function there. The history grows by exactly
//! `batch_size` rows per iteration and is never reordered nor shrunk.

use crate::errors::Result;
use crate::normalization::Normalizer;
use crate::sampling::RandomSampler;
use crate::solver::{acquisition, hyperfit};
use crate::solver::{BoConfig, BoState};
use crate::surrogate::{SurrogateBuilder, SurrogateModel};
use crate::utils::find_best_index;

use argmin::argmin_error_closure;
use argmin::core::{CostFunction, Problem, Solver, State, TerminationStatus, KV};

use env_logger::{Builder, Env};
use log::{debug, info};
use ndarray::{concatenate, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Instant;

/// Implementation of `argmin::core::Solver` for the Bayesian optimizer.
/// This structure can be used with `argmin::core::Executor` directly,
/// though the [`crate::BoBuilder`] entry point is the usual way in.
#[derive(Clone, Serialize, Deserialize)]
pub struct BoSolver<SB: SurrogateBuilder> {
    pub(crate) config: BoConfig,
    /// Matrix (nx, 2) of [lower bound, upper bound] of the nx components of x
    pub(crate) xlimits: Array2<f64>,
    pub(crate) sampler: RandomSampler,
    /// Builder of the surrogate model approximating the objective function
    pub(crate) surrogate_builder: SB,
    /// Seed of the run random state
    pub(crate) seed: u64,
    /// Surrogate model built at initialization, refit along the run
    #[serde(skip)]
    pub(crate) model: Option<Box<dyn SurrogateModel>>,
}

impl<SB: SurrogateBuilder> BoSolver<SB> {
    /// Constructor given a configuration, a surrogate builder, the design
    /// space bounds as a (nx, 2) matrix and the run seed.
    ///
    /// Configuration and bounds are validated here, before any objective
    /// evaluation occurs.
    pub fn new(
        config: BoConfig,
        surrogate_builder: SB,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        seed: u64,
    ) -> Result<Self> {
        let env = Env::new().filter_or("BAYESOPT_LOG", "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        config.check()?;
        let sampler = RandomSampler::new(xlimits)?;
        Ok(BoSolver {
            config,
            xlimits: xlimits.to_owned(),
            sampler,
            surrogate_builder,
            seed,
            model: None,
        })
    }

    fn build_model(&self) -> Result<Box<dyn SurrogateModel>> {
        let mut builder = self.surrogate_builder.clone();
        builder.set_kernel_spec(self.config.kernel);
        builder.set_mean_spec(self.config.mean_function);
        builder.set_fixed_noise(self.config.noise);
        builder.build(&self.xlimits.view())
    }

    /// Evaluate the objective function at given x points
    fn eval_obj<O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>>(
        pb: &mut Problem<O>,
        x: &Array2<f64>,
    ) -> Array2<f64> {
        pb.problem("cost_count", |problem| problem.cost(x))
            .expect("Objective evaluation")
    }
}

impl<O, SB> Solver<O, BoState<f64>> for BoSolver<SB>
where
    O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>,
    SB: SurrogateBuilder + DeserializeOwned,
{
    const NAME: &'static str = "Bayesopt";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: BoState<f64>,
    ) -> std::result::Result<(BoState<f64>, Option<KV>), argmin::core::Error> {
        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);

        let initial_size = if self.config.initial_size == 0 {
            (self.xlimits.nrows() + 1).max(5)
        } else {
            self.config.initial_size
        };
        info!("Compute initial random batch with {initial_size} points");
        let x_data = self.sampler.sample_with_rng(initial_size, &mut rng);
        let y_data = Self::eval_obj(problem, &x_data);

        if self.config.hessian {
            info!(
                "Curvature information requested; the {:?} backend is first-order, option ignored",
                self.config.nl_solver
            );
        }

        // The surrogate is trained on the first output column only, possibly
        // normalized; the other columns carry auxiliary inspection data.
        let mut model = self.build_model()?;
        let yt = Normalizer::new(self.config.normalize_y).normalize(&y_data.view());
        model.set_training_data(&x_data.view(), &yt.column(0))?;
        self.model = Some(model);

        let best_index = find_best_index(&y_data);
        let mut initial_state = state.data((x_data.clone(), y_data.clone())).rng(rng);
        initial_state.doe_size = x_data.nrows();
        initial_state.max_iters = self.config.iterations as u64;
        initial_state.best_index = Some(best_index);
        initial_state.prev_best_index = Some(best_index);
        initial_state.last_best_iter = 0;

        info!(
            "********* Initialization: Best fun(x[{}])={} at x={}",
            best_index,
            y_data.row(best_index),
            x_data.row(best_index)
        );
        Ok((initial_state, None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: BoState<f64>,
    ) -> std::result::Result<(BoState<f64>, Option<KV>), argmin::core::Error> {
        debug!(
            "********* Start iteration {}/{}",
            state.get_iter() + 1,
            state.get_max_iters()
        );
        let now = Instant::now();
        let mut new_state = state;

        let mut rng = new_state.take_rng().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "BoSolver: no random state!"
        ))?;
        let (x_data, y_data) = new_state.take_data().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "BoSolver: no data!"
        ))?;
        let model = self.model.as_mut().ok_or_else(argmin_error_closure!(
            PotentialBug,
            "BoSolver: no surrogate model!"
        ))?;

        // Refit the surrogate hyperparameters on the current data
        hyperfit::optimize_restarts(model.as_mut(), self.config.model_restarts, &mut rng)?;

        // Materialize posterior hyperparameter samples for inspection;
        // they play no role in the point selection below
        if self.config.samples > 0 {
            debug!(
                "Draw {} hyperparameter samples from the posterior",
                self.config.samples
            );
            new_state.hyper_samples = Some(model.sample_posterior(self.config.samples, &mut rng)?);
        }

        // Propose the next batch by minimizing the acquisition criterion
        let (acq_value, x_new) = acquisition::propose(
            model.as_ref(),
            &self.sampler,
            self.config.batch_size,
            self.config.opt_restarts,
            self.config.nl_solver,
            &mut rng,
        )?;
        info!("Acquisition criterion min found = {acq_value}");

        // Evaluate the black-box function at the suggested points;
        // the single expensive operation of the whole iteration
        let y_new = Self::eval_obj(problem, &x_new);

        let param = x_new.row(0).to_owned();
        let cost = y_new.row(0).to_owned();

        // Grow the history; past evaluations are never dropped nor reordered
        let x_data = concatenate![Axis(0), x_data, x_new];
        let y_data = concatenate![Axis(0), y_data, y_new];

        // Re-derive the surrogate training targets from the whole updated
        // history first output column
        let yt = Normalizer::new(self.config.normalize_y).normalize(&y_data.view());
        model.set_training_data(&x_data.view(), &yt.column(0))?;

        let best_index = find_best_index(&y_data);
        new_state.prev_best_index = new_state.best_index;
        new_state.best_index = Some(best_index);

        let new_state = new_state
            .data((x_data.clone(), y_data.clone()))
            .param(param)
            .cost(cost)
            .acq_value(acq_value)
            .rng(rng);

        info!(
            "********* End iteration {}/{} in {:.3}s: Best fun(x[{}])={} at x={}",
            new_state.get_iter() + 1,
            new_state.get_max_iters(),
            now.elapsed().as_secs_f64(),
            best_index,
            y_data.row(best_index),
            x_data.row(best_index)
        );
        Ok((new_state, None))
    }

    fn terminate(&mut self, state: &BoState<f64>) -> TerminationStatus {
        debug!("Current cost {:?}", state.get_cost());
        debug!("Best cost {:?}", state.get_best_cost());
        debug!("Best index {:?}", state.best_index);

        TerminationStatus::NotTerminated
    }
}
