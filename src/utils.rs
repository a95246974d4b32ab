use ndarray::{ArrayBase, Data, Ix2};
use ndarray_stats::QuantileExt;

/// Find the index of the minimal objective value (first column) in the
/// observed outputs. Ties resolve to the earliest row, so a point evaluated
/// first keeps its rank against later duplicates.
pub fn find_best_index<F: PartialOrd>(y_data: &ArrayBase<impl Data<Elem = F>, Ix2>) -> usize {
    y_data
        .column(0)
        .argmin()
        .expect("data holds at least one evaluated point")
}
