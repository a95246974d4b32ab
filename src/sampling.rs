use crate::errors::{BoError, Result};
use ndarray::{Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{rand::Rng, rand_distr::Uniform, RandomExt};
use serde::{Deserialize, Serialize};

/// Uniform random sampling within a rectangular design space.
///
/// The design space is a (nx, 2) matrix where the ith row is the
/// `[lower_bound, upper_bound]` interval of xi, the ith component of x.
/// Each dimension is drawn independently, with no cross-dimension
/// correlation. Randomness comes from the generator passed at sampling
/// time so that a whole run can be replayed from a single seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomSampler {
    xlimits: Array2<f64>,
}

impl RandomSampler {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// Fails when the design space is empty, when a bound is not finite or
    /// when a lower bound exceeds its upper bound.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Self> {
        if xlimits.ncols() != 2 {
            return Err(BoError::InvalidConfigError(format!(
                "bounds must have 2 columns (lower, upper), got {}",
                xlimits.ncols()
            )));
        }
        if xlimits.nrows() == 0 {
            return Err(BoError::InvalidConfigError(
                "bounds must have at least one dimension".to_string(),
            ));
        }
        for (i, row) in xlimits.outer_iter().enumerate() {
            if !row[0].is_finite() || !row[1].is_finite() {
                return Err(BoError::InvalidConfigError(format!(
                    "bounds[{}] = [{}, {}] is not finite",
                    i, row[0], row[1]
                )));
            }
            if row[0] > row[1] {
                return Err(BoError::InvalidConfigError(format!(
                    "bounds[{}]: lower bound {} exceeds upper bound {}",
                    i, row[0], row[1]
                )));
            }
        }
        Ok(RandomSampler {
            xlimits: xlimits.to_owned(),
        })
    }

    /// Returns the bounds of the sample space
    pub fn sampling_space(&self) -> &Array2<f64> {
        &self.xlimits
    }

    /// Generates a (k, nx)-shaped array of samples belonging to
    /// `[lower_bound_xi, upper_bound_xi]^nx` using the given generator
    pub fn sample_with_rng<R: Rng>(&self, k: usize, rng: &mut R) -> Array2<f64> {
        let nx = self.xlimits.nrows();
        let lower = self.xlimits.column(0);
        let scaler = &self.xlimits.column(1) - &lower;
        let normalized: Array2<f64> = Array::random_using((k, nx), Uniform::new(0., 1.), rng);
        normalized * scaler + lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_sample_within_bounds() {
        let xlimits = arr2(&[[5., 10.], [0., 1.], [-3., -1.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let actual = sampler.sample_with_rng(100, &mut rng);
        assert_eq!(&[100, 3], actual.shape());
        for row in actual.outer_iter() {
            for (i, limits) in xlimits.outer_iter().enumerate() {
                assert!(row[i] >= limits[0] && row[i] <= limits[1]);
            }
        }
    }

    #[test]
    fn test_sample_reproducible() {
        let xlimits = arr2(&[[0., 25.]]);
        let sampler = RandomSampler::new(&xlimits).unwrap();
        let mut rng1 = Xoshiro256Plus::seed_from_u64(7);
        let mut rng2 = Xoshiro256Plus::seed_from_u64(7);
        let s1 = sampler.sample_with_rng(10, &mut rng1);
        let s2 = sampler.sample_with_rng(10, &mut rng2);
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_sample_empty_batch() {
        let sampler = RandomSampler::new(&arr2(&[[0., 1.], [0., 1.]])).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let actual = sampler.sample_with_rng(0, &mut rng);
        assert_eq!(&[0, 2], actual.shape());
    }

    #[test]
    fn test_degenerate_interval() {
        let sampler = RandomSampler::new(&arr2(&[[2., 2.]])).unwrap();
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let actual = sampler.sample_with_rng(5, &mut rng);
        for v in actual.iter() {
            assert_eq!(2., *v);
        }
    }

    #[test]
    fn test_malformed_bounds_rejected() {
        assert!(RandomSampler::new(&arr2(&[[1., 0.]])).is_err());
        assert!(RandomSampler::new(&Array2::<f64>::zeros((0, 2))).is_err());
        assert!(RandomSampler::new(&arr2(&[[0., f64::INFINITY]])).is_err());
    }
}
