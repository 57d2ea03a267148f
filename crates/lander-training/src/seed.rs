use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed of the search's random stream.
///
/// A 128-bit seed for [`Pcg32`], written as a 32-character hex string. Running the
/// same episode with the same seed and parameters reproduces the same search.
///
/// # Example
///
/// ```
/// use lander_training::seed::SearchSeed;
/// use rand::Rng as _;
///
/// let seed: SearchSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// assert_eq!(seed.to_string(), "000102030405060708090a0b0c0d0e0f");
///
/// let mut a = seed.rng();
/// let mut b = seed.rng();
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSeed([u8; 16]);

/// The seed string was not 32 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex characters")]
pub struct ParseSeedError {
    input: String,
}

impl SearchSeed {
    /// Draws a fresh seed from the thread-local OS-seeded generator.
    #[must_use]
    pub fn random() -> Self {
        rand::rng().random()
    }

    /// A new generator positioned at the start of this seed's stream.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for SearchSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for SearchSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SearchSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SearchSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<SearchSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SearchSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SearchSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_random_seed() {
        let seed = SearchSeed::random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: SearchSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn test_known_value() {
        let seed = SearchSeed([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
    }

    #[test]
    fn test_accepts_uppercase() {
        let seed: SearchSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_rejects_invalid_input() {
        let too_long = "0".repeat(33);
        for input in [
            "",
            "0123",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
            too_long.as_str(),
        ] {
            assert!(input.parse::<SearchSeed>().is_err(), "{input:?}");
        }
        let result: Result<SearchSeed, _> = serde_json::from_str("\"xyz\"");
        assert!(result.unwrap_err().to_string().contains("invalid hex seed"));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let seed = SearchSeed::random();
        let a: Vec<u32> = seed.rng().random_iter().take(16).collect();
        let b: Vec<u32> = seed.rng().random_iter().take(16).collect();
        assert_eq!(a, b);
    }
}
