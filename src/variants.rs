//! Alternative samplers used for comparison with [CompositionInversion](crate::CompositionInversion)
//!
//! Both follow the [Sampler] contract but consume a variable number of
//! deviates per sample, so their output sequences differ from the main
//! sampler even for the same seed. Only the distribution is the same.
//!
use crate::density::{PiecewiseLinearDensity, Slice};
use crate::sampler::Sampler;
use crate::seed::SeedSequence;
use crate::SetupError;
use rand::rngs::StdRng;
use rand::Rng;

///
/// Rejection (hit-or-miss) sampler
///
/// Draws points uniformly from the rectangle spanning the support and
/// the highest control point, and returns the abscissa of the first point
/// that lands under the density curve.
///
#[derive(Debug)]
pub struct HitOrMiss {
    density: PiecewiseLinearDensity,
    rng: StdRng,
    support: (f64, f64),
    top: f64,
}

impl Sampler for HitOrMiss {
    const NAME: &'static str = "hit-or-miss";

    fn new(xs: &[f64], ys: &[f64], seed: &SeedSequence) -> Result<Self, SetupError> {
        let density = PiecewiseLinearDensity::new(xs, ys)?;
        let support = density.support();
        // Positive area guarantees positive height
        let top = density.max_height();
        Ok(Self {
            density,
            rng: seed.rng(),
            support,
            top,
        })
    }

    fn generate(&mut self) -> f64 {
        let (lo, hi) = self.support;
        loop {
            let x = self.rng.gen_range(lo..hi);
            let y = self.rng.gen_range(0.0..self.top);

            if y < self.density.height(x) {
                return x;
            }
        }
    }

    fn density(&self) -> &PiecewiseLinearDensity {
        &self.density
    }
}

///
/// Composition sampler with geometric sampling inside a slice
///
/// The slice is located by bisection of the cumulative table, which selects
/// the same slice as the linear scan of [PiecewiseLinearDensity::select_slice].
/// The trapezoid is then split into a rectangle of the lower height and a
/// triangle on top of it. The rectangle is sampled uniformly; the triangle by
/// taking the larger (rising slope) or smaller (falling slope) of two uniform
/// deviates, which avoids the square root of the inversion formula.
///
#[derive(Debug)]
pub struct GeometricComposition {
    density: PiecewiseLinearDensity,
    rng: StdRng,
}

impl GeometricComposition {
    fn bisect_slice(&self, u: f64) -> usize {
        let last = self.density.len() - 1;
        self.density.cumulative()[1..]
            .partition_point(|f| *f < u)
            .min(last)
    }

    fn sample_slice(&mut self, slice: &Slice) -> f64 {
        let (y1, y2) = (slice.start().y, slice.end().y);
        let x1 = slice.start().x;
        let width = slice.width();
        let rectangle = f64::min(y1, y2) * width;

        let t = if self.rng.gen::<f64>() * slice.area() < rectangle {
            self.rng.gen::<f64>()
        } else {
            let a: f64 = self.rng.gen();
            let b: f64 = self.rng.gen();
            if y2 > y1 {
                a.max(b)
            } else {
                a.min(b)
            }
        };
        x1 + t * width
    }
}

impl Sampler for GeometricComposition {
    const NAME: &'static str = "geometric-composition";

    fn new(xs: &[f64], ys: &[f64], seed: &SeedSequence) -> Result<Self, SetupError> {
        let density = PiecewiseLinearDensity::new(xs, ys)?;
        Ok(Self {
            density,
            rng: seed.rng(),
        })
    }

    fn generate(&mut self) -> f64 {
        let u: f64 = self.rng.gen();
        let k = self.bisect_slice(u);
        let slice = self.density.slices()[k];
        self.sample_slice(&slice)
    }

    fn density(&self) -> &PiecewiseLinearDensity {
        &self.density
    }
}
