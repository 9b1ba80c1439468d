//! Kolmogorov-Smirnov goodness-of-fit tests
//!
//! Used to check that the samplers reproduce the requested density, either
//! against its analytic CDF (one-sample test) or against the output of
//! another sampler (two-sample test). Both check the null hypothesis that
//! the samples come from the same distribution:
//! ```
//! # use piecewise_sampler::stat_tests::*;
//! # use rand::prelude::*;
//! # fn main() -> Result<(), TestError> {
//! let mut rng = StdRng::seed_from_u64(1);
//! let s1: Vec<f64> = (0..100).map(|_| rng.gen()).collect();
//! let s2: Vec<f64> = (0..70).map(|_| rng.gen()).collect();
//!
//! let test_result = ks2_test(s1, s2)?;
//! println!("KS statistic {} p-value {}", test_result.stat(), test_result.p_value());
//! # Ok(())}
//! ```
//!
use std::f64::consts::PI;
use thiserror::Error;

///
/// Error that can be raised by a statistical test
///
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TestError {
    /// Case when a type to test supports only a partial order and some of the entries are not
    /// present in the order sequence (e.g. NaN in floats)
    #[error("Collection contains values that cannot be placed in an order sequence (e.g. NaN for floats)")]
    ContainsNotSortableValues,
    #[error("Cannot perform a test on an empty sample")]
    EmptySample,
}

/// Empirical cumulative distribution function
///
/// Step-like approximation to the cdf of the distribution the samples were
/// drawn from. For `x ∈ [xᵢ, xᵢ₊₁)` its value is `(i + 1)/N`, with `xᵢ` the
/// sorted samples (0-based) and `N` their count.
///
#[derive(Debug, Clone)]
pub struct Ecdf<T>
where
    T: PartialOrd + Copy,
{
    sorted: Vec<T>,
}

impl<T> Ecdf<T>
where
    T: PartialOrd + Copy,
{
    /// Sort the samples into an ecdf
    ///
    /// # Errors
    /// If the samples are empty or some of them are not comparable.
    ///
    pub fn new(mut samples: Vec<T>) -> Result<Self, TestError> {
        if samples.is_empty() {
            return Err(TestError::EmptySample);
        }
        if samples.iter().any(|v| v.partial_cmp(v).is_none()) {
            return Err(TestError::ContainsNotSortableValues);
        }
        // Every value is comparable with itself so the order is total
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Ok(Self { sorted: samples })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Always false, empty ecdf cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Value of the ecdf at `val`
    pub fn get(&self, val: T) -> f64 {
        let idx = self.sorted.partition_point(|x| *x <= val);
        idx as f64 / self.sorted.len() as f64
    }

    /// Samples in ascending order
    pub fn samples(&self) -> &[T] {
        &self.sorted
    }
}

///
/// Result of a statistical test
///
/// Holds the value of the test statistic and its p-value for the effective
/// sample size.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    stat: f64,
    p: f64,
    n: f64,
}

impl TestResult {
    /// Survival function of the Kolmogorov distribution `Q(z) = P(K > z)`
    ///
    /// Uses the two series from "Numerical Recipes" (Press et al. 2007), the
    /// first converging quickly for small and the second for large `z`.
    ///
    /// # Panics
    /// If `z` is negative.
    ///
    fn kolmogorov_sf(z: f64) -> f64 {
        assert!(z >= 0.0, "Value of test statistic outside the support");

        if z == 0.0 {
            return 1.0;
        }
        if z < 1.18 {
            let y = f64::exp(-PI * PI / (8.0 * z * z));
            let series: f64 = [1, 9, 25, 49].iter().map(|k| y.powi(*k)).sum();
            1.0 - f64::sqrt(2.0 * PI) / z * series
        } else {
            let y = f64::exp(-2.0 * z * z);
            2.0 * (y - y.powi(4) + y.powi(9))
        }
    }

    /// KS result for statistic `stat` with effective sample size `n`
    fn new_ks(stat: f64, n: f64) -> Self {
        let sqrt_n = n.sqrt();
        let z = (sqrt_n + 0.12 + 0.11 / sqrt_n) * stat;
        Self {
            stat,
            p: Self::kolmogorov_sf(z),
            n,
        }
    }

    /// Probability of observing the data under the null hypothesis
    pub fn p_value(&self) -> f64 {
        self.p
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }

    /// Effective sample size used for the p-value
    pub fn effective_size(&self) -> f64 {
        self.n
    }
}

///
/// One sample Kolmogorov-Smirnov test against a reference `cdf`
///
/// The statistic is the largest distance between the reference cdf and the
/// ecdf, taken on both sides of every step:
///
/// $$ D = \max_i \max\left(\frac{i}{N} - F(x_i), F(x_i) - \frac{i - 1}{N}\right) $$
///
pub fn ks1_test<T>(cdf: impl Fn(&T) -> f64, samples: Vec<T>) -> Result<TestResult, TestError>
where
    T: PartialOrd + Copy,
{
    let ecdf = Ecdf::new(samples)?;
    let n = ecdf.len() as f64;

    let stat = ecdf
        .samples()
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let f = cdf(x);
            f64::max((i + 1) as f64 / n - f, f - i as f64 / n)
        })
        .fold(0.0, f64::max);

    Ok(TestResult::new_ks(stat, n))
}

///
/// Two sample Kolmogorov-Smirnov test
///
/// The statistic is the largest distance between the two ecdfs. Both sorted
/// samples are walked together and repeated values are consumed at once, so
/// ties do not inflate the statistic.
///
pub fn ks2_test<T>(sample1: Vec<T>, sample2: Vec<T>) -> Result<TestResult, TestError>
where
    T: PartialOrd + Copy,
{
    let ecdf1 = Ecdf::new(sample1)?;
    let ecdf2 = Ecdf::new(sample2)?;
    let (a, b) = (ecdf1.samples(), ecdf2.samples());
    let (n1, n2) = (a.len() as f64, b.len() as f64);

    let mut stat = 0.0;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let x = if a[i] <= b[j] { a[i] } else { b[j] };
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        stat = f64::max(stat, (i as f64 / n1 - j as f64 / n2).abs());
    }

    Ok(TestResult::new_ks(stat, n1 * n2 / (n1 + n2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ecdf() {
        let samples = [0.3, 0.1, 0.5, 0.7];
        let ecdf = Ecdf::new(samples.into()).unwrap();

        assert_eq!(0.0, ecdf.get(-2.0));

        assert_eq!(0.25, ecdf.get(0.1));
        assert_eq!(0.25, ecdf.get(0.2));

        assert_eq!(0.75, ecdf.get(0.5));
        assert_eq!(0.75, ecdf.get(0.6));

        assert_eq!(1.0, ecdf.get(0.7));
        assert_eq!(&[0.1, 0.3, 0.5, 0.7], ecdf.samples());
    }

    #[test]
    fn test_ecdf_errors() {
        assert_eq!(
            TestError::EmptySample,
            Ecdf::<f64>::new(vec![]).unwrap_err()
        );
        assert_eq!(
            TestError::ContainsNotSortableValues,
            Ecdf::new(vec![0.3, f64::NAN, 0.1]).unwrap_err()
        );
    }

    #[test]
    fn test_ks1_test() {
        let samples = [0.3, 0.2, 0.25, 0.1, 0.9, 0.6];
        // Largest gap is at 0.3 where the ecdf reaches 4/6
        let lhs = TestResult::new_ks(4.0 / 6.0 - 0.3, 6.0);
        let rhs = ks1_test(|x| *x, samples.into()).unwrap();

        assert_relative_eq!(lhs.stat(), rhs.stat(), epsilon = 1e-12);
        assert_relative_eq!(lhs.p_value(), rhs.p_value(), epsilon = 1e-12);
    }

    #[test]
    fn test_ks1_error() {
        let samples = [0.3, 0.2, 0.25, 0.1, 0.9, 0.6, f64::NAN];
        assert!(
            ks1_test(|x| *x, samples.into()).is_err(),
            "Failed to detect nan in the list"
        )
    }

    #[test]
    fn test_ks1_uniform_sample() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(87674);
        let samples = (0..10000).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();

        let res = ks1_test(|x| *x, samples).unwrap();
        println!("{res:?}");
        assert!(res.p_value() > 0.001);
    }

    #[test]
    fn test_ks1_rejects_wrong_distribution() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(87674);
        let samples = (0..10000)
            .map(|_| rng.gen::<f64>().powi(2))
            .collect::<Vec<_>>();

        let res = ks1_test(|x| *x, samples).unwrap();
        assert!(res.p_value() < 1e-6);
    }

    #[test]
    fn test_ks2_test() {
        let samples1 = [0.3, 0.2, 0.25, 0.1, 0.9, 0.6];
        let samples2 = [0.1, 0.8, 0.34, 0.09, 0.12, 0.81];

        let rhs = ks2_test(samples1.into(), samples2.into()).unwrap();
        let lhs = TestResult::new_ks(1.0 / 3.0, 3.0);

        assert_relative_eq!(lhs.stat(), rhs.stat(), epsilon = 1e-12);
        assert_relative_eq!(lhs.p_value(), rhs.p_value(), epsilon = 1e-12);
        assert_eq!(3.0, rhs.effective_size());
    }

    #[test]
    fn test_ks2_test_repeated_samples() {
        let samples1 = [1, 2, 2, 3];
        let samples2 = [2];

        let rhs = ks2_test(samples1.into(), samples2.into()).unwrap();
        let lhs = TestResult::new_ks(0.25, 0.8);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_kolmogorov_sf() {
        // Approximate reference points obtained from SciPy
        let test_points = [
            (0.0, 1.0),
            (1.0, 2.6999967168e-01),
            (2.0, 6.7092525578e-04),
            (3.0, 3.045996e-08),
            (100.0, 0.0),
        ];

        for (x, val) in test_points {
            assert_relative_eq!(val, TestResult::kolmogorov_sf(x), max_relative = 1.0e-7);
        }
    }

    #[test]
    #[should_panic]
    fn test_kolmogorov_sf_invalid_range() {
        TestResult::kolmogorov_sf(-2.0);
    }
}
