//! Piecewise-linear probability density and its slice decomposition
//!
use crate::SetupError;
use is_sorted::IsSorted;
use rand::distributions::Distribution;
use rand::Rng;
use std::cmp::Ordering;
use tracing::debug;

/// Point of the density curve
///
/// `y` is the unnormalised height of the density at `x`.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

///
/// Trapezoidal part of the density between two consecutive control points
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    p1: ControlPoint,
    p2: ControlPoint,
    area: f64,
}

impl Slice {
    fn new(p1: ControlPoint, p2: ControlPoint) -> Self {
        let area = (p1.y + p2.y) * (p2.x - p1.x) / 2.0;
        Self { p1, p2, area }
    }

    /// Left end of the slice
    pub fn start(&self) -> ControlPoint {
        self.p1
    }

    /// Right end of the slice
    pub fn end(&self) -> ControlPoint {
        self.p2
    }

    /// Unnormalised probability mass under the slice (trapezoid rule)
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn width(&self) -> f64 {
        self.p2.x - self.p1.x
    }

    /// True if the density is constant over the slice
    pub fn is_flat(&self) -> bool {
        self.p1.y == self.p2.y
    }

    /// Slope of the density over the slice
    pub fn slope(&self) -> f64 {
        (self.p2.y - self.p1.y) / (self.p2.x - self.p1.x)
    }

    /// Unnormalised density at `x` (linear interpolation, no range check)
    pub fn height(&self, x: f64) -> f64 {
        self.p1.y + self.slope() * (x - self.p1.x)
    }

    ///
    /// Map a uniform deviate `u ∈ [0, 1)` to a point of the slice
    ///
    /// Inverts the cumulative distribution function of the density restricted
    /// to the slice. For the flat slice it is a plain uniform distribution.
    /// Otherwise, with `m` the slope, the local CDF
    ///
    /// $$ F(x) = \frac{y_1 (x - x_1) + m (x - x_1)^2 / 2}{A} $$
    ///
    /// solved for `F(x) = u` gives:
    ///
    /// $$ x = x_1 + \frac{\sqrt{(y_2^2 - y_1^2) u + y_1^2} - y_1}{m} $$
    ///
    pub fn invert(&self, u: f64) -> f64 {
        let (x1, x2) = (self.p1.x, self.p2.x);
        let (y1, y2) = (self.p1.y, self.p2.y);

        if y1 == y2 {
            x1 + u * (x2 - x1)
        } else {
            let m = (y2 - y1) / (x2 - x1);
            x1 + (f64::sqrt((y2 * y2 - y1 * y1) * u + y1 * y1) - y1) / m
        }
    }

    ///
    /// Cumulative distribution function of the density restricted to the slice
    ///
    /// Returns 0 below and 1 above the slice. A slice with zero area is
    /// treated as uniform.
    ///
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= self.p1.x {
            return 0.0;
        } else if x >= self.p2.x {
            return 1.0;
        }
        let t = x - self.p1.x;

        if self.area == 0.0 {
            t / self.width()
        } else {
            (self.p1.y * t + self.slope() * t * t / 2.0) / self.area
        }
    }

    /// Integral of `x * f(x)` over the slice for the unnormalised density
    fn first_moment(&self) -> f64 {
        let (x1, x2) = (self.p1.x, self.p2.x);
        let (y1, y2) = (self.p1.y, self.p2.y);
        (x2 - x1) / 6.0 * (y1 * (2.0 * x1 + x2) + y2 * (x1 + 2.0 * x2))
    }
}

///
/// Density given by linear interpolation between control points
///
/// Holds the slices together with the normalised weight of each slice and
/// the cumulative table used to select a slice. All of it is computed once
/// at construction and never changes afterwards.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearDensity {
    points: Vec<ControlPoint>,
    slices: Vec<Slice>,
    total_area: f64,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
}

impl PiecewiseLinearDensity {
    ///
    /// Build the density from the coordinates of the control points
    ///
    /// # Errors
    /// - [SetupError::LengthMismatch] if `xs` and `ys` differ in length
    /// - [SetupError::TooFewPoints] if there is less than two points
    /// - [SetupError::NonFinite] if any coordinate is NaN or infinite, or if
    ///   a squared height or the total area overflows
    /// - [SetupError::UnsortedGrid] if `xs` is not strictly increasing
    /// - [SetupError::NegativePdf] if any of `ys` is negative
    /// - [SetupError::ZeroArea] if the density integrates to zero
    ///
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, SetupError> {
        // Check preconditions
        if xs.len() != ys.len() {
            return Err(SetupError::LengthMismatch);
        } else if xs.len() < 2 {
            return Err(SetupError::TooFewPoints);
        } else if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(SetupError::NonFinite);
        } else if ys.iter().any(|y| !(y * y).is_finite()) {
            // Squared heights enter the inversion of sloped slices
            return Err(SetupError::NonFinite);
        } else if !is_strictly_increasing(xs) {
            return Err(SetupError::UnsortedGrid);
        } else if ys.iter().any(|v| *v < 0.0) {
            return Err(SetupError::NegativePdf);
        }

        let points = std::iter::zip(xs, ys)
            .map(|(x, y)| ControlPoint { x: *x, y: *y })
            .collect::<Vec<_>>();

        let slices = points
            .windows(2)
            .map(|w| Slice::new(w[0], w[1]))
            .collect::<Vec<_>>();

        let total_area: f64 = slices.iter().map(Slice::area).sum();
        if !total_area.is_finite() {
            return Err(SetupError::NonFinite);
        } else if total_area <= 0.0 {
            return Err(SetupError::ZeroArea);
        }

        let weights = slices
            .iter()
            .map(|s| s.area() / total_area)
            .collect::<Vec<_>>();
        let cumulative = cumulative_table(&weights);

        debug!(
            slices = slices.len(),
            total_area, "built piecewise-linear density"
        );

        Ok(Self {
            points,
            slices,
            total_area,
            weights,
            cumulative,
        })
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Number of slices
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Always false, a valid density has at least one slice
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Probability of selecting each slice
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Prefix sums of the weights, starting with `0.0`
    ///
    /// Has one more entry than there are slices.
    ///
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Interval `(x_first, x_last)` outside of which the density is zero
    pub fn support(&self) -> (f64, f64) {
        // At least two points are guaranteed by the constructor
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        (first.x, last.x)
    }

    /// The largest control point height
    pub fn max_height(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(0.0, f64::max)
    }

    /// Index of the slice containing `x` or None if outside the support
    fn locate(&self, x: f64) -> Option<usize> {
        let (lo, hi) = self.support();
        if !(lo..=hi).contains(&x) {
            return None;
        }
        let idx = self.points.partition_point(|p| p.x <= x);
        Some((idx - 1).min(self.slices.len() - 1))
    }

    /// Unnormalised density at `x`
    pub fn height(&self, x: f64) -> f64 {
        match self.locate(x) {
            Some(k) => self.slices[k].height(x),
            None => 0.0,
        }
    }

    /// Normalised probability density function
    pub fn pdf(&self, x: f64) -> f64 {
        self.height(x) / self.total_area
    }

    /// Cumulative distribution function
    pub fn cdf(&self, x: f64) -> f64 {
        let (lo, hi) = self.support();
        if x <= lo {
            return 0.0;
        } else if x >= hi {
            return 1.0;
        }
        self.locate(x).map_or(f64::NAN, |k| {
            self.cumulative[k] + self.weights[k] * self.slices[k].cdf(x)
        })
    }

    /// Expectation of the distribution
    pub fn mean(&self) -> f64 {
        let moment: f64 = self.slices.iter().map(Slice::first_moment).sum();
        moment / self.total_area
    }

    ///
    /// Select the slice for a uniform deviate `u ∈ [0, 1)`
    ///
    /// Returns `K = j - 1` for the smallest `j ≥ 1` with `u <= F[j]` where `F`
    /// is the [cumulative](Self::cumulative) table. Cumulative rounding may
    /// leave `F[n]` a little below 1, in which case the last slice is taken.
    ///
    pub fn select_slice(&self, u: f64) -> usize {
        let last = self.slices.len() - 1;
        self.cumulative[1..]
            .iter()
            .position(|f| u <= *f)
            .map_or(last, |k| k.min(last))
    }
}

///
/// Draws samples from the density
///
/// Every sample consumes exactly two deviates from `rng`: the first selects
/// the slice and the second is inverted inside it.
///
impl Distribution<f64> for PiecewiseLinearDensity {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u_select: f64 = rng.gen();
        let u_invert: f64 = rng.gen();

        let k = self.select_slice(u_select);
        self.slices[k].invert(u_invert)
    }
}

fn is_strictly_increasing(grid: &[f64]) -> bool {
    IsSorted::is_sorted_by(&mut grid.iter(), |a, b| {
        if a < b {
            Some(Ordering::Less)
        } else {
            None
        }
    })
}

/// Prefix sums of the weights with a leading zero
fn cumulative_table(weights: &[f64]) -> Vec<f64> {
    let mut cdf = vec![0.0];
    cdf.reserve(weights.len());

    for p in weights {
        // We know CDF is never empty
        let top = cdf[cdf.len() - 1];
        cdf.push(top + p);
    }
    cdf
}
