use crate::errors::{BoError, Result};
use crate::types::ObjFn;
use ndarray::{arr1, Array1, Array2, ArrayView1};

use cobyla::RhoBeg;

#[derive(Copy, Clone, Debug)]
pub(crate) enum Algorithm {
    Cobyla,
    Slsqp,
}

pub(crate) const MAX_EVAL_DEFAULT: usize = 2000;

/// Facade for the local nonlinear solver backends.
///
/// Runs a single bounded local minimization of `fun` from `xinit` and
/// returns the solution with its objective value. A backend failure status
/// surfaces as an error to be handled per restart trial by the caller.
pub(crate) struct Optimizer<'a> {
    algo: Algorithm,
    fun: &'a (dyn ObjFn<()> + Sync),
    bounds: Array2<f64>,
    max_eval: usize,
    xinit: Option<Array1<f64>>,
    ftol_abs: Option<f64>,
    ftol_rel: Option<f64>,
}

impl<'a> Optimizer<'a> {
    pub fn new(algo: Algorithm, fun: &'a (dyn ObjFn<()> + Sync), bounds: &Array2<f64>) -> Self {
        Optimizer {
            algo,
            fun,
            bounds: bounds.clone(),
            max_eval: MAX_EVAL_DEFAULT,
            xinit: None,
            ftol_abs: None,
            ftol_rel: None,
        }
    }

    pub fn ftol_abs(&mut self, ftol_abs: f64) -> &mut Self {
        self.ftol_abs = Some(ftol_abs);
        self
    }

    pub fn ftol_rel(&mut self, ftol_rel: f64) -> &mut Self {
        self.ftol_rel = Some(ftol_rel);
        self
    }

    pub fn max_eval(&mut self, max_eval: usize) -> &mut Self {
        self.max_eval = max_eval;
        self
    }

    pub fn xinit(&mut self, xinit: &ArrayView1<f64>) -> &mut Self {
        self.xinit = Some(xinit.to_owned());
        self
    }

    pub fn minimize(&self) -> Result<(f64, Array1<f64>)> {
        let xinit = self
            .xinit
            .clone()
            .unwrap_or_else(|| self.bounds.column(0).to_owned())
            .to_vec();
        let bounds: Vec<_> = self
            .bounds
            .outer_iter()
            .map(|row| (row[0], row[1]))
            .collect();

        let res = match self.algo {
            Algorithm::Cobyla => {
                let cons: Vec<&dyn cobyla::Func<()>> = vec![];
                let res = cobyla::minimize(
                    |x: &[f64], u: &mut ()| (self.fun)(x, None, u),
                    &xinit,
                    &bounds,
                    &cons,
                    (),
                    self.max_eval,
                    RhoBeg::All(0.5),
                    Some(cobyla::StopTols {
                        ftol_rel: self.ftol_rel.unwrap_or(0.0),
                        ftol_abs: self.ftol_abs.unwrap_or(0.0),
                        ..cobyla::StopTols::default()
                    }),
                );
                match res {
                    Ok((_, x_opt, y_opt)) => Ok((y_opt, arr1(&x_opt))),
                    Err((status, _, _)) => {
                        Err(BoError::LocalSolverFailure(format!("Cobyla {status:?}")))
                    }
                }
            }
            Algorithm::Slsqp => {
                let cons: Vec<fn(&[f64], Option<&mut [f64]>, &mut ()) -> f64> = vec![];
                let res = slsqp::minimize(
                    self.fun,
                    &xinit,
                    &bounds,
                    &cons,
                    (),
                    self.max_eval,
                    Some(slsqp::StopTols {
                        ftol_rel: self.ftol_rel.unwrap_or(0.0),
                        ftol_abs: self.ftol_abs.unwrap_or(0.0),
                        ..slsqp::StopTols::default()
                    }),
                );
                match res {
                    Ok((_, x_opt, y_opt)) => Ok((y_opt, arr1(&x_opt))),
                    Err((status, _, _)) => {
                        Err(BoError::LocalSolverFailure(format!("Slsqp {status:?}")))
                    }
                }
            }
        };
        log::debug!("... end local optimization");
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn quadratic(x: &[f64], gradient: Option<&mut [f64]>, _u: &mut ()) -> f64 {
        if let Some(g) = gradient {
            g[0] = 2. * (x[0] - 0.3);
        }
        (x[0] - 0.3) * (x[0] - 0.3)
    }

    #[test]
    fn test_cobyla_minimize_quadratic() {
        let bounds = array![[0., 1.]];
        let (y_opt, x_opt) = Optimizer::new(Algorithm::Cobyla, &quadratic, &bounds)
            .xinit(&array![0.9].view())
            .max_eval(200)
            .ftol_rel(1e-6)
            .minimize()
            .expect("Cobyla minimization");
        assert_abs_diff_eq!(x_opt[0], 0.3, epsilon = 1e-3);
        assert_abs_diff_eq!(y_opt, 0., epsilon = 1e-4);
    }

    #[test]
    fn test_slsqp_minimize_quadratic() {
        let bounds = array![[0., 1.]];
        let (y_opt, x_opt) = Optimizer::new(Algorithm::Slsqp, &quadratic, &bounds)
            .xinit(&array![0.9].view())
            .max_eval(200)
            .ftol_rel(1e-6)
            .minimize()
            .expect("Slsqp minimization");
        assert_abs_diff_eq!(x_opt[0], 0.3, epsilon = 1e-3);
        assert_abs_diff_eq!(y_opt, 0., epsilon = 1e-4);
    }

    #[test]
    fn test_solution_respects_bounds() {
        // unconstrained minimum at 0.3 lies outside the box
        let bounds = array![[0.5, 1.]];
        let (_, x_opt) = Optimizer::new(Algorithm::Slsqp, &quadratic, &bounds)
            .xinit(&array![0.8].view())
            .max_eval(200)
            .minimize()
            .expect("Slsqp minimization");
        assert!(x_opt[0] >= 0.5 - 1e-8 && x_opt[0] <= 1. + 1e-8);
    }
}
