/// Implementation of `argmin::core::State` for the Bayesian optimizer
use crate::surrogate::ParamSamples;
use crate::utils::find_best_index;

use argmin::core::{ArgminFloat, Problem, State, TerminationReason, TerminationStatus};
use ndarray::{Array1, Array2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maintains the state from iteration to iteration of the
/// [`crate::BoSolver`].
///
/// This struct is passed from one iteration of the algorithm to the next.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoState<F> {
    /// Current parameter vector (first point of the last proposed batch)
    pub param: Option<Array1<F>>,
    /// Previous parameter vector
    pub prev_param: Option<Array1<F>>,
    /// Current best parameter vector
    pub best_param: Option<Array1<F>>,
    /// Previous best parameter vector
    pub prev_best_param: Option<Array1<F>>,

    /// Current cost function value
    /// The first component is the actual objective value while the
    /// remaining ones are auxiliary output values
    pub cost: Option<Array1<F>>,
    /// Previous cost function value
    pub prev_cost: Option<Array1<F>>,
    /// Current best cost function value
    pub best_cost: Option<Array1<F>>,
    /// Previous best cost function value
    pub prev_best_cost: Option<Array1<F>>,
    /// Target cost function value
    pub target_cost: F,

    /// Current iteration
    pub iter: u64,
    /// Iteration number of last best cost
    pub last_best_iter: u64,
    /// Maximum number of iterations
    pub max_iters: u64,
    /// Evaluation counts
    pub counts: HashMap<String, u64>,
    /// Time required so far
    pub time: Option<web_time::Duration>,
    /// Optimization status
    pub termination_status: TerminationStatus,

    /// Initial random batch size
    pub doe_size: usize,
    /// Acquisition criterion value of the last proposed batch
    pub acq_value: F,
    /// Historic data (evaluated points, observed outputs)
    pub data: Option<(Array2<F>, Array2<F>)>,
    /// Previous index of best result in data
    pub prev_best_index: Option<usize>,
    /// Index of best result in data
    pub best_index: Option<usize>,
    /// Posterior hyperparameter samples drawn at the last iteration,
    /// materialized for inspection
    pub hyper_samples: Option<ParamSamples>,

    /// Random number generator for reproducibility
    pub rng: Option<Xoshiro256Plus>,
}

impl<F> BoState<F>
where
    Self: State<Float = F>,
    F: ArgminFloat,
{
    /// Set parameter vector. This shifts the stored parameter vector to the
    /// previous parameter vector.
    #[must_use]
    pub fn param(mut self, param: Array1<F>) -> Self {
        std::mem::swap(&mut self.prev_param, &mut self.param);
        self.param = Some(param);
        self
    }

    /// Set target cost.
    ///
    /// When this cost is reached, the algorithm will stop. The default is
    /// `Self::Float::NEG_INFINITY`.
    #[must_use]
    pub fn target_cost(mut self, target_cost: F) -> Self {
        self.target_cost = target_cost;
        self
    }

    /// Set maximum number of iterations
    #[must_use]
    pub fn max_iters(mut self, iters: u64) -> Self {
        self.max_iters = iters;
        self
    }

    /// Set the current cost function value. This shifts the stored cost
    /// function value to the previous cost function value.
    #[must_use]
    pub fn cost(mut self, cost: Array1<F>) -> Self {
        std::mem::swap(&mut self.prev_cost, &mut self.cost);
        self.cost = Some(cost);
        self
    }

    /// Set the evaluation history.
    ///
    /// Data is expressed as a couple (xdata, ydata) where:
    /// * xdata is a (p, nx) matrix of evaluated points,
    /// * ydata is a (p, ny) matrix of observed outputs, row-parallel to
    ///   xdata, whose first column is the objective value
    pub fn data(mut self, data: (Array2<F>, Array2<F>)) -> Self {
        self.data = Some(data);
        self
    }

    /// Moves the current data out and replaces it internally with `None`.
    pub fn take_data(&mut self) -> Option<(Array2<F>, Array2<F>)> {
        self.data.take()
    }

    /// Set the random number generator used to draw random points
    pub fn rng(mut self, rng: Xoshiro256Plus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Moves the current random number generator out and replaces it
    /// internally with `None`.
    pub fn take_rng(&mut self) -> Option<Xoshiro256Plus> {
        self.rng.take()
    }

    /// Set the acquisition criterion value of the last proposed batch
    pub fn acq_value(mut self, value: F) -> Self {
        self.acq_value = value;
        self
    }

    /// Returns the acquisition criterion value of the last proposed batch
    pub fn get_acq_value(&self) -> F {
        self.acq_value
    }

    /// Returns the current full cost value: objective and auxiliary outputs
    pub fn get_full_cost(&self) -> Option<&Array1<F>> {
        self.cost.as_ref()
    }

    /// Returns the full cost value of the best point observed so far
    pub fn get_full_best_cost(&self) -> Option<&Array1<F>> {
        self.best_cost.as_ref()
    }
}

impl<F> State for BoState<F>
where
    F: ArgminFloat,
{
    /// Type of parameter vector
    type Param = Array1<F>;
    /// Floating point precision
    type Float = F;

    /// Create a new `BoState` instance
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::{State, TerminationStatus};
    /// use bayesopt::BoState;
    /// let state: BoState<f64> = BoState::new();
    ///
    /// # assert!(state.param.is_none());
    /// # assert!(state.data.is_none());
    /// # assert_eq!(state.iter, 0);
    /// # assert_eq!(state.max_iters, u64::MAX);
    /// # assert_eq!(state.termination_status, TerminationStatus::NotTerminated);
    /// ```
    fn new() -> Self {
        BoState {
            param: None,
            prev_param: None,
            best_param: None,
            prev_best_param: None,

            cost: None,
            prev_cost: None,
            best_cost: None,
            prev_best_cost: None,
            target_cost: F::neg_infinity(),

            iter: 0,
            last_best_iter: 0,
            max_iters: u64::MAX,
            counts: HashMap::new(),
            time: Some(web_time::Duration::new(0, 0)),
            termination_status: TerminationStatus::NotTerminated,

            doe_size: 0,
            acq_value: F::infinity(),
            data: None,
            prev_best_index: None,
            best_index: None,
            hyper_samples: None,

            rng: Some(Xoshiro256Plus::from_entropy()),
        }
    }

    /// Checks whether the history holds a new best point. If so, best
    /// parameter vector and best cost are updated accordingly.
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use ndarray::array;
    /// # use bayesopt::BoState;
    ///
    /// let state: BoState<f64> = BoState::new();
    /// let mut state = state.data((array![[1.0f64], [2.0], [3.0]], array![[10.0], [5.0], [0.5]]));
    /// state.iter = 2;
    /// state.prev_best_index = Some(0);
    /// state.best_index = Some(2);
    ///
    /// state.update();
    ///
    /// assert_eq!(state.best_param.as_ref().unwrap()[0], 3.0f64);
    /// assert_eq!(state.best_cost.as_ref().unwrap()[0], 0.5);
    /// assert!(state.is_best());
    /// ```
    fn update(&mut self) {
        if let Some((x_data, y_data)) = self.data.as_ref() {
            let best_index = self.best_index.unwrap_or_else(|| find_best_index(y_data));

            let param = x_data.row(best_index).to_owned();
            std::mem::swap(&mut self.prev_best_param, &mut self.best_param);
            self.best_param = Some(param);

            let cost = y_data.row(best_index).to_owned();
            std::mem::swap(&mut self.prev_best_cost, &mut self.best_cost);
            self.best_cost = Some(cost);

            if best_index >= self.doe_size {
                if let Some(prev_best_index) = self.prev_best_index {
                    if best_index != prev_best_index {
                        self.last_best_iter = self.iter + 1;
                    }
                }
            }
            // best point in the initial batch => last_best_iter remains 0
        }
    }

    /// Returns a reference to the current parameter vector
    fn get_param(&self) -> Option<&Array1<F>> {
        self.param.as_ref()
    }

    /// Returns a reference to the current best parameter vector
    fn get_best_param(&self) -> Option<&Array1<F>> {
        self.best_param.as_ref()
    }

    /// Sets the termination status to
    /// [`Terminated`](`TerminationStatus::Terminated`) with the given reason
    fn terminate_with(mut self, reason: TerminationReason) -> Self {
        self.termination_status = TerminationStatus::Terminated(reason);
        self
    }

    /// Sets the time required so far.
    fn time(&mut self, time: Option<web_time::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    /// Returns the current objective value (first output component)
    fn get_cost(&self) -> Self::Float {
        match self.cost.as_ref() {
            Some(c) => *(c.get(0).unwrap_or(&Self::Float::infinity())),
            None => Self::Float::infinity(),
        }
    }

    /// Returns the best objective value observed so far
    fn get_best_cost(&self) -> Self::Float {
        match self.best_cost.as_ref() {
            Some(c) => *(c.get(0).unwrap_or(&Self::Float::infinity())),
            None => Self::Float::infinity(),
        }
    }

    /// Returns the target cost function value
    fn get_target_cost(&self) -> Self::Float {
        self.target_cost
    }

    /// Returns the current number of iterations.
    fn get_iter(&self) -> u64 {
        self.iter
    }

    /// Returns the iteration number of the last best parameter vector.
    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    /// Returns the maximum number of iterations.
    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Returns the termination status.
    fn get_termination_status(&self) -> &TerminationStatus {
        &self.termination_status
    }

    /// Returns the termination reason if terminated, otherwise None.
    fn get_termination_reason(&self) -> Option<&TerminationReason> {
        match &self.termination_status {
            TerminationStatus::Terminated(reason) => Some(reason),
            TerminationStatus::NotTerminated => None,
        }
    }

    /// Returns the time elapsed since the start of the optimization.
    fn get_time(&self) -> Option<web_time::Duration> {
        self.time
    }

    /// Increments the number of iterations by one
    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    /// Set all function evaluation counts to the evaluation counts of
    /// another `Problem`.
    fn func_counts<O>(&mut self, problem: &Problem<O>) {
        for (k, &v) in problem.counts.iter() {
            let count = self.counts.entry(k.to_string()).or_insert(0);
            *count = v
        }
    }

    /// Returns function evaluation counts
    fn get_func_counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Returns whether the current parameter vector is also the best
    /// parameter vector found so far.
    fn is_best(&self) -> bool {
        self.last_best_iter == self.iter + 1
    }
}
