//! Multistart optimization of the surrogate model hyperparameters.

use crate::errors::{BoError, Result};
use crate::surrogate::SurrogateModel;

use log::{debug, warn};
use rand_xoshiro::Xoshiro256Plus;

/// Fit the model hyperparameters with a best-of-N multistart strategy.
///
/// The parameter state at entry is the initial incumbent, so the model
/// never leaves this function worse (by its own fitting objective) than it
/// entered, whatever the restart count. Each restart randomizes the
/// parameters, runs the model's own local optimizer to convergence and
/// reads back the reached optimum. A failing restart is discarded with a
/// diagnostic and the loop goes on; a cancellation is re-raised
/// immediately. Selection is by strictly smaller objective value, so ties
/// keep the earliest candidate, the incumbent included.
///
/// Trials run sequentially: each one needs exclusive mutating access to the
/// one model instance.
pub(crate) fn optimize_restarts(
    model: &mut dyn SurrogateModel,
    restarts: usize,
    rng: &mut Xoshiro256Plus,
) -> Result<()> {
    model.prepare_fit()?;

    let mut par_min = model.params();
    let mut val_min = model.fit_objective(&par_min.view())?;
    debug!("Hyperparameter fit: initial objective = {val_min}");

    for trial in 0..restarts {
        let outcome = run_trial(model, rng);
        match outcome {
            Ok((val, par)) => {
                if val < val_min {
                    debug!("Hyperparameter restart {trial}: {val} < {val_min}");
                    val_min = val;
                    par_min = par;
                }
            }
            Err(BoError::CancellationError) => return Err(BoError::CancellationError),
            Err(err) => {
                warn!("Hyperparameter restart {trial} failed: {err}");
            }
        }
    }

    model.set_params(&par_min.view());
    Ok(())
}

/// One randomize-then-optimize trial; a NaN objective counts as a failure
fn run_trial(
    model: &mut dyn SurrogateModel,
    rng: &mut Xoshiro256Plus,
) -> Result<(f64, ndarray::Array1<f64>)> {
    model.randomize_params(rng);
    model.optimize_params()?;
    let par = model.params();
    let val = model.fit_objective(&par.view())?;
    if val.is_nan() {
        return Err(BoError::SurrogateError(
            "fitting objective is NaN".to_string(),
        ));
    }
    Ok((val, par))
}
