//! Bayesian optimizer entry point.
//!
//! [`BoBuilder`] assembles the optimizer from the objective function, a
//! surrogate builder and a configuration; [`Bo::run`] executes the whole
//! sequential loop for a given seed and returns the full evaluation
//! history.

use crate::errors::{BoError, Result};
use crate::solver::{BoConfig, BoSolver};
use crate::surrogate::SurrogateBuilder;
use crate::types::{GroupFunc, ObjFunc, OptimResult};

use argmin::core::{Executor, State, TerminationReason};
use log::info;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use serde::de::DeserializeOwned;

/// Builder of a Bayesian optimizer for a given objective function.
///
/// The objective maps a (p, nx) batch of points to a (p, ny) output matrix
/// whose first column is minimized; the remaining columns are recorded as
/// auxiliary data.
pub struct BoBuilder<O: GroupFunc> {
    fobj: O,
    config: BoConfig,
}

impl<O: GroupFunc> BoBuilder<O> {
    /// Start assembling an optimizer for the function to be minimized
    pub fn optimize(fobj: O) -> Self {
        BoBuilder {
            fobj,
            config: BoConfig::default(),
        }
    }

    /// Set the configuration of the optimizer
    pub fn configure<F: FnOnce(BoConfig) -> BoConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Set the builder of the surrogate model approximating the objective
    pub fn surrogate<SB: SurrogateBuilder>(self, surrogate_builder: SB) -> BoFactory<O, SB> {
        BoFactory {
            fobj: self.fobj,
            surrogate_builder,
            config: self.config,
        }
    }
}

/// Optimizer builder holding the surrogate model builder
pub struct BoFactory<O: GroupFunc, SB: SurrogateBuilder> {
    fobj: O,
    surrogate_builder: SB,
    config: BoConfig,
}

impl<O: GroupFunc, SB: SurrogateBuilder> BoFactory<O, SB> {
    /// Set the configuration of the optimizer
    pub fn configure<F: FnOnce(BoConfig) -> BoConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Build a [`Bo`] optimizer minimizing the function within the
    /// continuous `xlimits` specified as a (nx, 2) [[lower, upper], ...]
    /// matrix where the number of rows gives the dimension of the inputs.
    ///
    /// Configuration and bounds are validated here, before any objective
    /// evaluation occurs.
    pub fn min_within(self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Bo<O, SB>> {
        self.config.check()?;
        crate::sampling::RandomSampler::new(xlimits)?;
        Ok(Bo {
            fobj: ObjFunc::new(self.fobj),
            surrogate_builder: self.surrogate_builder,
            config: self.config,
            xlimits: xlimits.to_owned(),
        })
    }
}

/// Bayesian optimizer ready to run.
///
/// Holds the wrapped objective, the surrogate builder, the validated
/// configuration and the design space bounds. Each [`Bo::run`] call copies
/// the objective, seeds a fresh random state from the given seed and plays
/// the whole loop, so distinct seeds give independent reproducible runs.
pub struct Bo<O: GroupFunc, SB: SurrogateBuilder> {
    fobj: ObjFunc<O>,
    surrogate_builder: SB,
    config: BoConfig,
    xlimits: Array2<f64>,
}

impl<O: GroupFunc, SB: SurrogateBuilder + DeserializeOwned> Bo<O, SB> {
    /// Runs the optimization of the objective function for the given seed.
    ///
    /// Returns the full evaluation history together with the best observed
    /// point. A user interrupt (Ctrl-C) stops the run between iterations
    /// and surfaces as [`BoError::CancellationError`].
    pub fn run(&self, seed: u64) -> Result<OptimResult<f64>> {
        let solver = BoSolver::new(
            self.config.clone(),
            self.surrogate_builder.clone(),
            &self.xlimits,
            seed,
        )?;
        info!("{:?}", self.config);

        let result = Executor::new(self.fobj.clone(), solver).run()?;
        info!("{result}");

        let state = result.state;
        if matches!(
            state.get_termination_reason(),
            Some(TerminationReason::Interrupt)
        ) {
            return Err(BoError::CancellationError);
        }

        let (x_hist, y_hist) = state.clone().take_data().expect("history set at init");
        let res = OptimResult {
            x_opt: state
                .get_best_param()
                .expect("best point set at init")
                .to_owned(),
            y_opt: state
                .get_full_best_cost()
                .expect("best cost set at init")
                .to_owned(),
            x_hist,
            y_hist,
            state,
        };
        info!("Optim Result: min f(x)={} at x={}", res.y_opt, res.x_opt);
        Ok(res)
    }
}
