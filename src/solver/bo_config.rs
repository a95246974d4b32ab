//! Bayesian optimizer configuration.
use crate::errors::{BoError, Result};
use crate::surrogate::{KernelSpec, MeanSpec};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Local solver used to optimize the acquisition criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcqSolver {
    /// SLSQP solver (gradient based)
    Slsqp,
    /// COBYLA solver (gradient free)
    Cobyla,
}

impl FromStr for AcqSolver {
    type Err = BoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "slsqp" => Ok(AcqSolver::Slsqp),
            "cobyla" => Ok(AcqSolver::Cobyla),
            _ => Err(BoError::InvalidConfigError(format!(
                "unknown solver identifier '{s}' (expected 'slsqp' or 'cobyla')"
            ))),
        }
    }
}

/// Bayesian optimizer configuration
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct BoConfig {
    /// Number of outer iterations allocated to find the optimum.
    /// The number of objective evaluations is `initial_size + iterations * batch_size`.
    pub(crate) iterations: usize,
    /// Number of points proposed and evaluated at each iteration, optimized jointly
    pub(crate) batch_size: usize,
    /// Number of initial points drawn uniformly at random.
    /// Note: initial_size > 0; otherwise initial_size = max(xdim + 1, 5)
    pub(crate) initial_size: usize,
    /// Whether curvature information is offered to the acquisition solver.
    /// Backends without curvature support ignore it.
    pub(crate) hessian: bool,
    /// Optional known observation noise variance, held constant and
    /// excluded from hyperparameter fitting
    pub(crate) noise: Option<f64>,
    /// Whether observed objective values are rescaled to zero mean and
    /// unit variance before surrogate fitting
    pub(crate) normalize_y: bool,
    /// Number of restarts for multistart hyperparameter optimization
    pub(crate) model_restarts: usize,
    /// Number of hyperparameter samples drawn from the posterior at each
    /// iteration for inspection; 0 disables posterior sampling
    pub(crate) samples: usize,
    /// Number of restarts for multistart acquisition optimization
    pub(crate) opt_restarts: usize,
    /// The local solver used to optimize the acquisition criterion
    pub(crate) nl_solver: AcqSolver,
    /// Correlation kernel of the surrogate model
    pub(crate) kernel: KernelSpec,
    /// Mean function of the surrogate model; `None` means zero mean
    pub(crate) mean_function: Option<MeanSpec>,
}

impl Default for BoConfig {
    fn default() -> Self {
        BoConfig {
            iterations: 20,
            batch_size: 1,
            initial_size: 0,
            hessian: false,
            noise: None,
            normalize_y: true,
            model_restarts: 10,
            samples: 0,
            opt_restarts: 20,
            nl_solver: AcqSolver::Slsqp,
            kernel: KernelSpec::SquaredExponential,
            mean_function: None,
        }
    }
}

impl BoConfig {
    /// Sets the number of outer iterations
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the number of points proposed and evaluated at each iteration
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Number of initial random samples (when 0 a number of points is
    /// computed automatically regarding the number of input variables
    /// of the function under optimization)
    pub fn initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// Whether curvature information is offered to the acquisition solver
    pub fn hessian(mut self, hessian: bool) -> Self {
        self.hessian = hessian;
        self
    }

    /// Sets a known observation noise variance, held constant during fitting
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Whether observed objective values are normalized before fitting
    pub fn normalize_y(mut self, normalize_y: bool) -> Self {
        self.normalize_y = normalize_y;
        self
    }

    /// Sets the number of restarts of the hyperparameter optimization
    pub fn model_restarts(mut self, model_restarts: usize) -> Self {
        self.model_restarts = model_restarts;
        self
    }

    /// Sets the number of posterior hyperparameter samples drawn at each
    /// iteration (0 disables posterior sampling)
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the number of restarts of the acquisition optimization
    pub fn opt_restarts(mut self, opt_restarts: usize) -> Self {
        self.opt_restarts = opt_restarts;
        self
    }

    /// Sets the local solver used to optimize the acquisition criterion
    pub fn nl_solver(mut self, nl_solver: AcqSolver) -> Self {
        self.nl_solver = nl_solver;
        self
    }

    /// Sets the correlation kernel of the surrogate model
    pub fn kernel(mut self, kernel: KernelSpec) -> Self {
        self.kernel = kernel;
        self
    }

    /// Sets the mean function of the surrogate model
    pub fn mean_function(mut self, mean_function: MeanSpec) -> Self {
        self.mean_function = Some(mean_function);
        self
    }

    /// Check configuration consistency before any evaluation occurs
    pub fn check(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BoError::InvalidConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.opt_restarts == 0 {
            return Err(BoError::InvalidConfigError(
                "opt_restarts must be at least 1".to_string(),
            ));
        }
        if let Some(noise) = self.noise {
            if !noise.is_finite() || noise < 0. {
                return Err(BoError::InvalidConfigError(format!(
                    "noise variance must be finite and non-negative, got {noise}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_identifier_parsing() {
        assert_eq!(AcqSolver::Slsqp, "slsqp".parse().unwrap());
        assert_eq!(AcqSolver::Cobyla, "Cobyla".parse().unwrap());
        assert!("bfgs".parse::<AcqSolver>().is_err());
    }

    #[test]
    fn test_invalid_counts_rejected() {
        assert!(BoConfig::default().batch_size(0).check().is_err());
        assert!(BoConfig::default().opt_restarts(0).check().is_err());
        assert!(BoConfig::default().noise(-1.).check().is_err());
        assert!(BoConfig::default().noise(f64::NAN).check().is_err());
    }

    #[test]
    fn test_default_config_valid() {
        assert!(BoConfig::default().check().is_ok());
    }
}
