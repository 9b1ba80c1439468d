//! Deterministic seeding of the uniform stream from a sequence of integers
//!
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Failed to read a seed sequence from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid seed word '{word}': {source}")]
pub struct SeedParseError {
    word: String,
    source: ParseIntError,
}

///
/// Ordered sequence of integers used to initialise a random stream
///
/// Identical sequences always produce identical streams. The words are
/// absorbed one by one into a SplitMix64 state which is then expanded into
/// the full seed of [StdRng], so every word (and the length of the sequence)
/// influences the whole stream.
///
/// Can be parsed from a comma separated list. A blank string is the empty
/// sequence, but empty words inside a list are rejected:
/// ```
/// # use piecewise_sampler::SeedSequence;
/// let seed: SeedSequence = "42, 42, 42".parse().unwrap();
/// assert_eq!(seed, SeedSequence::from([42, 42, 42]));
/// assert!("1,,2".parse::<SeedSequence>().is_err());
/// ```
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedSequence {
    words: Vec<u32>,
}

impl SeedSequence {
    pub fn new(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// Expand the sequence into a seed for [StdRng]
    pub fn to_seed(&self) -> [u8; 32] {
        let mut mixer = SplitMix64::new(self.words.len() as u64);
        for w in &self.words {
            mixer.absorb(u64::from(*w));
        }

        let mut seed = [0u8; 32];
        for chunk in seed.chunks_exact_mut(8) {
            chunk.copy_from_slice(&mixer.next_u64().to_le_bytes());
        }
        seed
    }

    /// Create a new random stream initialised from the sequence
    pub fn rng(&self) -> StdRng {
        StdRng::from_seed(self.to_seed())
    }
}

impl From<Vec<u32>> for SeedSequence {
    fn from(words: Vec<u32>) -> Self {
        Self::new(words)
    }
}

impl<const N: usize> From<[u32; N]> for SeedSequence {
    fn from(words: [u32; N]) -> Self {
        Self::new(words.to_vec())
    }
}

impl FromStr for SeedSequence {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(str::trim)
            .map(|w| {
                w.parse::<u32>().map_err(|source| SeedParseError {
                    word: w.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

/// SplitMix64 generator used only to spread the seed words
#[derive(Debug, Clone, Copy)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(state: u64) -> Self {
        Self { state }
    }

    fn absorb(&mut self, word: u64) {
        self.state ^= word;
        self.next_u64();
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
