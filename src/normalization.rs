use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Rescaling of observed outputs to stabilize surrogate fitting.
///
/// Only the first output column, the objective under minimization, is
/// rescaled; the remaining columns carry auxiliary data kept for inspection
/// and pass through unchanged.
#[derive(Clone, Copy, Debug)]
pub struct Normalizer {
    enabled: bool,
}

impl Normalizer {
    /// Constructor; when `enabled` is false `normalize` is the identity
    pub fn new(enabled: bool) -> Self {
        Normalizer { enabled }
    }

    /// Rescale the first column of `y` to zero mean and unit variance.
    ///
    /// The input is left untouched; a new array is returned. When the
    /// sample standard deviation of the first column is zero (all observed
    /// values identical, e.g. a constant objective) the column is returned
    /// unchanged rather than divided by zero.
    pub fn normalize(&self, y: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        let mut y_norm = y.to_owned();
        if !self.enabled || y.nrows() == 0 {
            return y_norm;
        }
        let col = y.column(0);
        let mean = col.mean().unwrap();
        let std = col.std(0.);
        if std > 0. {
            let mut out = y_norm.column_mut(0);
            out.mapv_inplace(|v| (v - mean) / std);
        }
        y_norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_normalize_first_column() {
        let y = array![[1., 10.], [2., 20.], [3., 30.], [4., 40.]];
        let y_norm = Normalizer::new(true).normalize(&y);
        assert_abs_diff_eq!(y_norm.column(0).mean().unwrap(), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(y_norm.column(0).std(0.), 1., epsilon = 1e-12);
        // auxiliary columns pass through
        assert_abs_diff_eq!(y.column(1), y_norm.column(1), epsilon = 1e-12);
        // input untouched
        assert_abs_diff_eq!(y[[0, 0]], 1., epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_constant_column_untouched() {
        let y = array![[7., 1.], [7., 2.], [7., 3.]];
        let y_norm = Normalizer::new(true).normalize(&y);
        assert_abs_diff_eq!(y, y_norm, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_twice_is_stable() {
        let y = array![[1.], [2.], [3.], [10.]];
        let normalizer = Normalizer::new(true);
        let once = normalizer.normalize(&y);
        let twice = normalizer.normalize(&once);
        assert_abs_diff_eq!(once, twice, epsilon = 1e-12);
    }

    #[test]
    fn test_disabled_is_identity() {
        let y = array![[1., 5.], [3., 6.]];
        let y_norm = Normalizer::new(false).normalize(&y);
        assert_abs_diff_eq!(y, y_norm, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let y = Array2::<f64>::zeros((0, 1));
        let y_norm = Normalizer::new(true).normalize(&y);
        assert_eq!(&[0, 1], y_norm.shape());
    }
}
