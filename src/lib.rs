//! Sample 1D distributions given by a piecewise-linear density
//!
//! The density is described by an ordered list of control points `(x, y)`.
//! Between two consecutive points the (unnormalised) density is the straight
//! line joining them, so each pair of points spans a trapezoidal *slice*.
//!
//! The main sampler [CompositionInversion] picks a slice with a probability
//! proportional to its area and then inverts the local cumulative
//! distribution function of that slice analytically:
//! ```
//! # use piecewise_sampler::{CompositionInversion, Sampler, SeedSequence, SetupError};
//! # fn main() -> Result<(), SetupError> {
//! let xs = [2.0, 3.0, 7.0, 10.0, 14.0, 15.0];
//! let ys = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
//! let mut sampler = CompositionInversion::new(&xs, &ys, &SeedSequence::from([42, 42, 42]))?;
//!
//! let x = sampler.generate();
//! assert!((2.0..=15.0).contains(&x));
//! # Ok(())}
//! ```
//!
//! Two alternative algorithms with the same [Sampler] contract are provided
//! for comparison: [HitOrMiss] and [GeometricComposition]. The [harness]
//! module runs all of them side by side.
//!
use thiserror::Error;

pub mod density;
pub mod harness;
pub mod sampler;
pub mod seed;
pub mod stat_tests;
pub mod variants;

pub use density::{ControlPoint, PiecewiseLinearDensity, Slice};
pub use sampler::{CompositionInversion, Sampler};
pub use seed::SeedSequence;
pub use variants::{GeometricComposition, HitOrMiss};

/// Invalid input given to construct a density or a sampler
///
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("Lengths of arrays to form a table are different")]
    LengthMismatch,
    #[error("At least two control points are required")]
    TooFewPoints,
    #[error("Control points contain non-finite values")]
    NonFinite,
    #[error("Values in a grid are not strictly increasing")]
    UnsortedGrid,
    #[error("Negative values present in probability density function")]
    NegativePdf,
    #[error("Probability density function has zero total area")]
    ZeroArea,
}
