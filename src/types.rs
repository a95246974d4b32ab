use crate::solver::BoState;
use argmin::core::CostFunction;
use ndarray::{Array1, Array2, ArrayView2};

/// Optimization result
#[derive(Clone, Debug)]
pub struct OptimResult<F> {
    /// Location of the best observed objective value
    pub x_opt: Array1<F>,
    /// Output row of the best observed point (objective first, then auxiliary data)
    pub y_opt: Array1<F>,
    /// History of all evaluated points, one row per evaluation
    pub x_hist: Array2<F>,
    /// History of all observed outputs, row-parallel to `x_hist`
    pub y_hist: Array2<F>,
    /// Final solver state
    pub state: BoState<F>,
}

/// An interface for the objective function under minimization
///
/// The function is expected to evaluate a whole batch of points at once:
/// given a (p, nx) matrix it returns a (p, ny) matrix whose first column
/// holds the objective values. The remaining columns, if any, carry
/// auxiliary data which are recorded in the history but never fed to the
/// surrogate model.
///
/// The function is cloned once per run. Stateful or stochastic objectives
/// (e.g. draws from a GP prior) must seed their copies independently so that
/// repeated runs do not correlate.
pub trait GroupFunc: Clone + Fn(&ArrayView2<f64>) -> Array2<f64> {}
impl<T> GroupFunc for T where T: Clone + Fn(&ArrayView2<f64>) -> Array2<f64> {}

/// A structure wrapping the objective function for implementing
/// `argmin::CostFunction` to be used with the argmin framework.
#[derive(Clone)]
pub struct ObjFunc<O: GroupFunc> {
    fobj: O,
}

impl<O: GroupFunc> ObjFunc<O> {
    /// Constructor given the objective function
    pub fn new(fobj: O) -> Self {
        ObjFunc { fobj }
    }
}

impl<O: GroupFunc> CostFunction for ObjFunc<O> {
    /// Type of the parameter vector
    type Param = Array2<f64>;
    /// Type of the return value computed by the cost function
    type Output = Array2<f64>;

    /// Apply the cost function to a batch of points `p`
    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok((self.fobj)(&p.view()))
    }
}

/// A trait for functions used by internal optimizers
/// Functions are expected to be defined as `g(x, g, u)` where
/// * `x` is the input information,
/// * `g` an optional gradient information to be updated if present
/// * `u` information provided by the user
pub trait ObjFn<U>: Fn(&[f64], Option<&mut [f64]>, &mut U) -> f64 {}
impl<T, U> ObjFn<U> for T where T: Fn(&[f64], Option<&mut [f64]>, &mut U) -> f64 {}
