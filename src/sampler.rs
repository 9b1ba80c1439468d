//! Common sampler contract and the composition-inversion sampler
//!
use crate::density::PiecewiseLinearDensity;
use crate::seed::SeedSequence;
use crate::SetupError;
use rand::distributions::Distribution;
use rand::rngs::StdRng;

///
/// Sampler of a piecewise-linear density owning its own random stream
///
/// All algorithms in the crate are built from the same inputs and expose the
/// same [generate](Sampler::generate) operation, so they can be swapped
/// freely in comparisons. The stream is owned by the sampler and advances on
/// each call; for parallel work create one sampler per worker with its own
/// seed.
///
pub trait Sampler: Sized {
    /// Short name used in reports
    const NAME: &'static str;

    /// Build the sampler from control points and a seed
    ///
    /// Fails without producing a sampler if the control points do not form a
    /// valid density (see [PiecewiseLinearDensity::new]).
    ///
    fn new(xs: &[f64], ys: &[f64], seed: &SeedSequence) -> Result<Self, SetupError>;

    /// Draw the next variate
    fn generate(&mut self) -> f64;

    /// The density being sampled
    fn density(&self) -> &PiecewiseLinearDensity;

    /// Draw `n` consecutive variates
    fn samples(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.generate()).collect()
    }
}

///
/// Composition and inversion sampler
///
/// Each call to [generate](Sampler::generate) consumes exactly two uniform
/// deviates from the stream, in a fixed order:
/// 1. The first selects the slice `K` from the cumulative table of slice
///    weights ([PiecewiseLinearDensity::select_slice]).
/// 2. The second is mapped onto slice `K` by inverting its local cumulative
///    distribution function ([Slice::invert](crate::Slice::invert)).
///
/// Thus for a given seed the output sequence is fully reproducible.
///
#[derive(Debug)]
pub struct CompositionInversion {
    density: PiecewiseLinearDensity,
    rng: StdRng,
}

impl Sampler for CompositionInversion {
    const NAME: &'static str = "composition-inversion";

    fn new(xs: &[f64], ys: &[f64], seed: &SeedSequence) -> Result<Self, SetupError> {
        let density = PiecewiseLinearDensity::new(xs, ys)?;
        Ok(Self {
            density,
            rng: seed.rng(),
        })
    }

    fn generate(&mut self) -> f64 {
        self.density.sample(&mut self.rng)
    }

    fn density(&self) -> &PiecewiseLinearDensity {
        &self.density
    }
}
