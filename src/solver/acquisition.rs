//! Multistart optimization of the acquisition criterion producing the
//! candidate batch evaluated at each outer iteration.

use crate::errors::{BoError, Result};
use crate::optimizers::{Algorithm, Optimizer, MAX_EVAL_DEFAULT};
use crate::sampling::RandomSampler;
use crate::solver::AcqSolver;
use crate::surrogate::SurrogateModel;

use log::{debug, info, warn};
use ndarray::{concatenate, Array2, ArrayView, Axis};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

const ACQ_MIN_EVAL: usize = 100;

/// Propose the next evaluation batch by minimizing the acquisition
/// criterion from `opt_restarts` random starting batches.
///
/// The batch is optimized jointly: the search-space bounds are tiled
/// `batch_size` times into one joint variable of size `batch_size * nx`, so
/// criteria coupling the batch points (e.g. penalizing near-duplicates) are
/// handled by the local solver as a single problem.
///
/// Every start batch is drawn before the trials run, which keeps the
/// parallel trial phase deterministic for a given random state. The best
/// candidate is the strictly smallest acquisition value across successful
/// trials, ties keeping the earliest trial. Failing trials are logged and
/// dropped; when no trial succeeds the whole iteration has no candidate to
/// evaluate and the error is fatal.
///
/// Returns the acquisition value together with the (batch_size, nx) batch.
pub(crate) fn propose(
    model: &dyn SurrogateModel,
    sampler: &RandomSampler,
    batch_size: usize,
    opt_restarts: usize,
    nl_solver: AcqSolver,
    rng: &mut Xoshiro256Plus,
) -> Result<(f64, Array2<f64>)> {
    let xlimits = sampler.sampling_space();
    let nx = xlimits.nrows();
    let n_flat = batch_size * nx;

    // Tile bounds to match batch size
    let bounds_tiled = concatenate(
        Axis(0),
        &vec![xlimits.view(); batch_size],
    )
    .expect("bounds tiling");

    let obj = |x: &[f64], gradient: Option<&mut [f64]>, _u: &mut ()| -> f64 {
        // The local solver may probe NaN points
        if x.iter().any(|v| v.is_nan()) {
            return f64::INFINITY;
        }
        let batch = ArrayView::from_shape((batch_size, nx), x).expect("batch shape");
        match model.acquisition(&batch) {
            Ok((value, grad)) => {
                if let Some(g) = gradient {
                    for (gi, v) in g.iter_mut().zip(grad.iter()) {
                        *gi = *v;
                    }
                }
                if value.is_nan() {
                    f64::INFINITY
                } else {
                    value
                }
            }
            Err(err) => {
                debug!("Acquisition evaluation failed: {err}");
                f64::INFINITY
            }
        }
    };

    let algorithm = match nl_solver {
        AcqSolver::Slsqp => Algorithm::Slsqp,
        AcqSolver::Cobyla => Algorithm::Cobyla,
    };

    // Fresh random initial batch per restart, drawn from the shared state
    let x_starts: Vec<Array2<f64>> = (0..opt_restarts)
        .map(|_| sampler.sample_with_rng(batch_size, rng))
        .collect();

    info!("Optimize acquisition criterion ({opt_restarts} restarts)...");
    let best = x_starts
        .into_par_iter()
        .enumerate()
        .map(|(trial, x_start)| {
            debug!("Begin acquisition restart {trial}");
            let xinit = x_start.into_shape(n_flat).expect("flattened start batch");
            let res = Optimizer::new(algorithm, &obj, &bounds_tiled)
                .xinit(&xinit.view())
                .max_eval((10 * n_flat).clamp(ACQ_MIN_EVAL, MAX_EVAL_DEFAULT))
                .ftol_rel(1e-4)
                .ftol_abs(1e-4)
                .minimize();
            debug!("End acquisition restart {trial}");
            match res {
                Ok((y_opt, x_opt)) if y_opt.is_finite() => Some((trial, y_opt, x_opt)),
                Ok((y_opt, _)) => {
                    warn!("Acquisition restart {trial} failed: non-finite value {y_opt}");
                    None
                }
                Err(err) => {
                    warn!("Acquisition restart {trial} failed: {err}");
                    None
                }
            }
        })
        .reduce(
            || None,
            |a, b| match (a, b) {
                (Some(a), Some(b)) => {
                    // strictly smaller wins, ties favor the earlier trial
                    if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
                        Some(b)
                    } else {
                        Some(a)
                    }
                }
                (a, None) => a,
                (None, b) => b,
            },
        );

    match best {
        Some((trial, y_opt, x_opt)) => {
            debug!("Best acquisition value {y_opt} from restart {trial}");
            let batch = x_opt
                .into_shape((batch_size, nx))
                .expect("batch reshaping");
            Ok((y_opt, batch))
        }
        None => Err(BoError::NoCandidateError(opt_restarts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogate::ParamSamples;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Array1, Array2, ArrayView1, ArrayView2, Zip};
    use ndarray_rand::rand::SeedableRng;

    /// Surrogate whose acquisition surface is a smooth bowl centered on a
    /// known point, summed over the batch.
    #[derive(Clone)]
    struct BowlSurrogate {
        center: Vec<f64>,
        always_nan: bool,
    }

    impl SurrogateModel for BowlSurrogate {
        fn set_training_data(&mut self, _xt: &ArrayView2<f64>, _yt: &ArrayView1<f64>) -> Result<()> {
            Ok(())
        }

        fn acquisition(&self, x: &ArrayView2<f64>) -> Result<(f64, Array2<f64>)> {
            if self.always_nan {
                return Ok((f64::NAN, Array2::zeros(x.raw_dim())));
            }
            let mut value = 0.;
            let mut grad = Array2::zeros(x.raw_dim());
            Zip::from(grad.rows_mut()).and(x.rows()).for_each(|mut g, xi| {
                for (j, c) in self.center.iter().enumerate() {
                    value += (xi[j] - c) * (xi[j] - c);
                    g[j] = 2. * (xi[j] - c);
                }
            });
            Ok((value, grad))
        }

        fn prepare_fit(&mut self) -> Result<()> {
            Ok(())
        }

        fn fit_objective(&self, _params: &ArrayView1<f64>) -> Result<f64> {
            Ok(0.)
        }

        fn params(&self) -> Array1<f64> {
            Array1::zeros(1)
        }

        fn set_params(&mut self, _params: &ArrayView1<f64>) {}

        fn randomize_params(&mut self, _rng: &mut Xoshiro256Plus) {}

        fn optimize_params(&mut self) -> Result<()> {
            Ok(())
        }

        fn sample_posterior(
            &self,
            _n_samples: usize,
            _rng: &mut Xoshiro256Plus,
        ) -> Result<ParamSamples> {
            unimplemented!()
        }
    }

    #[test]
    fn test_batch_shape_and_bounds() {
        let xlimits = arr2(&[[0., 1.], [-2., 2.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let model = BowlSurrogate {
            center: vec![0.4, 0.5],
            always_nan: false,
        };
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let (_, batch) = propose(&model, &sampler, 3, 5, AcqSolver::Cobyla, &mut rng).unwrap();
        assert_eq!(&[3, 2], batch.shape());
        for row in batch.outer_iter() {
            for (i, limits) in xlimits.outer_iter().enumerate() {
                assert!(row[i] >= limits[0] - 1e-8 && row[i] <= limits[1] + 1e-8);
            }
        }
    }

    #[test]
    fn test_converges_to_bowl_center() {
        let xlimits = arr2(&[[0., 1.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let model = BowlSurrogate {
            center: vec![0.3],
            always_nan: false,
        };
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let (value, batch) = propose(&model, &sampler, 1, 10, AcqSolver::Slsqp, &mut rng).unwrap();
        assert_abs_diff_eq!(batch[[0, 0]], 0.3, epsilon = 1e-2);
        assert!(value < 1e-3);
    }

    #[test]
    fn test_all_trials_failed_is_fatal() {
        let xlimits = arr2(&[[0., 1.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let model = BowlSurrogate {
            center: vec![0.3],
            always_nan: true,
        };
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let res = propose(&model, &sampler, 1, 4, AcqSolver::Slsqp, &mut rng);
        assert!(matches!(res, Err(BoError::NoCandidateError(4))));
    }

    #[test]
    fn test_proposal_reproducible() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let model = BowlSurrogate {
            center: vec![0.7, 0.2],
            always_nan: false,
        };
        let mut rng1 = Xoshiro256Plus::seed_from_u64(3);
        let mut rng2 = Xoshiro256Plus::seed_from_u64(3);
        let (v1, b1) = propose(&model, &sampler, 2, 6, AcqSolver::Slsqp, &mut rng1).unwrap();
        let (v2, b2) = propose(&model, &sampler, 2, 6, AcqSolver::Slsqp, &mut rng2).unwrap();
        assert_eq!(v1, v2);
        assert_eq!(b1, b2);
    }
}
