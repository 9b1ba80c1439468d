//! Side by side comparison of the samplers
//!
//! A run draws the same number of samples from every [Sampler] for each
//! density profile of a [HarnessConfig] and reports sample means, timings
//! and the agreement with the composition-inversion sampler. The
//! configuration is plain data and can be read from TOML:
//! ```
//! # use piecewise_sampler::harness::*;
//! # fn main() -> Result<(), HarnessError> {
//! let config = HarnessConfig::from_toml_str(r#"
//!     samples = 1000
//!     seed = [1, 2]
//!
//!     [[profiles]]
//!     name = "ramp"
//!     xs = [0.0, 1.0]
//!     ys = [0.0, 1.0]
//! "#)?;
//!
//! for report in run(&config)? {
//!     println!("{}: analytic mean {}", report.name, report.analytic_mean);
//! }
//! # Ok(())}
//! ```
//!
use crate::sampler::{CompositionInversion, Sampler};
use crate::seed::SeedSequence;
use crate::stat_tests::{ks2_test, TestError};
use crate::variants::{GeometricComposition, HitOrMiss};
use crate::{PiecewiseLinearDensity, SetupError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Invalid profile '{name}': {source}")]
    InvalidProfile { name: String, source: SetupError },
    #[error("Number of samples must be positive")]
    NoSamples,
    #[error("Failed to compare samples: {0}")]
    Comparison(#[from] TestError),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Named density given by its control points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Profile {
    pub fn new(name: &str, xs: &[f64], ys: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        }
    }

    fn density(&self) -> Result<PiecewiseLinearDensity, HarnessError> {
        PiecewiseLinearDensity::new(&self.xs, &self.ys).map_err(|source| {
            HarnessError::InvalidProfile {
                name: self.name.clone(),
                source,
            }
        })
    }
}

///
/// Everything a comparison run needs
///
/// Missing fields of a TOML file take the [default](HarnessConfig::default)
/// values: a million samples, seed `[42, 42, 42]` and the
/// [built-in profiles](builtin_profiles).
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub samples: usize,
    pub seed: SeedSequence,
    pub profiles: Vec<Profile>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            samples: 1_000_000,
            seed: SeedSequence::from([42, 42, 42]),
            profiles: builtin_profiles(),
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, HarnessError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Uniform, two triangles, rather flat and jagged densities
pub fn builtin_profiles() -> Vec<Profile> {
    vec![
        Profile::new("uniform", &[5.0, 15.0], &[1.0, 1.0]),
        Profile::new(
            "two triangles",
            &[2.0, 3.0, 7.0, 10.0, 14.0, 15.0],
            &[0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        ),
        Profile::new(
            "rather flat",
            &[2.0, 4.0, 7.0, 9.0, 12.0, 13.0, 17.0, 20.0],
            &[8.0, 10.0, 10.0, 9.0, 5.0, 9.0, 10.0, 6.0],
        ),
        Profile::new(
            "jagged",
            &[2.0, 3.0, 5.0, 10.0, 12.0, 13.0, 15.0, 17.0, 19.0, 20.0],
            &[1.0, 10.0, 0.0, 1.0, 8.0, 4.0, 1.0, 0.0, 2.0, 9.0],
        ),
    ]
}

/// Outcome of one sampler on one profile
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub name: &'static str,
    pub mean: f64,
    pub elapsed: Duration,
    /// Two-sample KS p-value against the composition-inversion samples
    ///
    /// None for the composition-inversion sampler itself.
    pub ks_p_value: Option<f64>,
}

/// Outcome of all samplers on one profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileReport {
    pub name: String,
    pub analytic_mean: f64,
    pub variants: Vec<VariantReport>,
}

fn draw<S: Sampler>(
    profile: &Profile,
    config: &HarnessConfig,
) -> Result<(Vec<f64>, Duration), HarnessError> {
    let mut sampler = S::new(&profile.xs, &profile.ys, &config.seed).map_err(|source| {
        HarnessError::InvalidProfile {
            name: profile.name.clone(),
            source,
        }
    })?;

    let start = Instant::now();
    let samples = sampler.samples(config.samples);
    Ok((samples, start.elapsed()))
}

fn compare<S: Sampler>(
    profile: &Profile,
    config: &HarnessConfig,
    reference: &[f64],
) -> Result<VariantReport, HarnessError> {
    let (samples, elapsed) = draw::<S>(profile, config)?;
    let mean = sample_mean(&samples);
    let ks = ks2_test(reference.to_vec(), samples)?;

    debug!(variant = S::NAME, mean, p_value = ks.p_value(), "variant finished");
    Ok(VariantReport {
        name: S::NAME,
        mean,
        elapsed,
        ks_p_value: Some(ks.p_value()),
    })
}

/// Run every sampler on a single profile
pub fn run_profile(
    profile: &Profile,
    config: &HarnessConfig,
) -> Result<ProfileReport, HarnessError> {
    if config.samples == 0 {
        return Err(HarnessError::NoSamples);
    }
    let density = profile.density()?;
    info!(profile = %profile.name, samples = config.samples, "sampling profile");

    let (reference, elapsed) = draw::<CompositionInversion>(profile, config)?;
    let mut variants = vec![VariantReport {
        name: CompositionInversion::NAME,
        mean: sample_mean(&reference),
        elapsed,
        ks_p_value: None,
    }];
    variants.push(compare::<HitOrMiss>(profile, config, &reference)?);
    variants.push(compare::<GeometricComposition>(profile, config, &reference)?);

    Ok(ProfileReport {
        name: profile.name.clone(),
        analytic_mean: density.mean(),
        variants,
    })
}

/// Run every sampler on every profile of the configuration
pub fn run(config: &HarnessConfig) -> Result<Vec<ProfileReport>, HarnessError> {
    config
        .profiles
        .iter()
        .map(|p| run_profile(p, config))
        .collect()
}

fn sample_mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}
