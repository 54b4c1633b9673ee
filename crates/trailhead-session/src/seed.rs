//! Device-identity seeds.
//!
//! A [`Seed`] makes device identity reproducible: the same seed always
//! produces the same fake device, so a player who keeps their seed
//! keeps looking like the same phone across runs.
//!
//! Seeds are derived from strings with a two-sided hash. The high 32
//! bits are the string's classic 31-multiplier hash; the low 32 bits are
//! the hash of the reversed string, shifted into the non-negative range.
//! Hashing both directions keeps "abc" and "cba" apart. This is not a
//! cryptographic hash.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 64-bit device-identity seed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seed(pub i64);

impl Seed {
    /// Derives a seed from an arbitrary identifier string.
    ///
    /// The string is hashed as UTF-16 code units, and "reversed" means
    /// reversing those code units, so results match any client that
    /// hashes strings the same way.
    pub fn from_identifier(identifier: &str) -> Self {
        let units: Vec<u16> = identifier.encode_utf16().collect();

        let upper = i64::from(string_hash(units.iter().copied())) << 32;
        let lower = i64::from(string_hash(units.iter().rev().copied()))
            - i64::from(i32::MIN);

        // `lower` is in [0, 2^32) and `upper` has its low 32 bits clear,
        // so the sum never overflows.
        Self(upper + lower)
    }

    /// Derives a seed from a fresh random identifier.
    pub fn random() -> Self {
        Self::from_identifier(&random_identifier())
    }

    /// Returns the raw value.
    pub fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `h = 31 * h + unit`, wrapping at 32 bits.
fn string_hash(units: impl Iterator<Item = u16>) -> i32 {
    units.fold(0i32, |h, unit| {
        h.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// A random 32-character hex identifier (128 bits).
fn random_identifier() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_identifier_is_deterministic() {
        for s in ["", "a", "player-one", "hello world", "ÄÖÜ"] {
            assert_eq!(Seed::from_identifier(s), Seed::from_identifier(s));
        }
    }

    #[test]
    fn test_from_identifier_empty_string() {
        // Both hashes are 0, so only the offset remains.
        assert_eq!(Seed::from_identifier("").0, 2_147_483_648);
    }

    #[test]
    fn test_from_identifier_known_values() {
        assert_eq!(Seed::from_identifier("a").0, 418_759_311_457);
        assert_eq!(Seed::from_identifier("abc").0, 413_839_426_420_706);
        assert_eq!(
            Seed::from_identifier("hello world").0,
            7_705_626_821_535_791_556
        );
    }

    #[test]
    fn test_from_identifier_reversal_pair_does_not_collide() {
        // "abc" and "cba" swap their forward and reverse hashes, so the
        // halves trade places instead of matching.
        let abc = Seed::from_identifier("abc");
        let cba = Seed::from_identifier("cba");

        assert_ne!(abc, cba);
        assert_eq!(cba.0, 422_085_763_627_106);
        assert_eq!(abc.0 >> 32, (cba.0 & 0xFFFF_FFFF) - (1 << 31));
    }

    #[test]
    fn test_from_identifier_negative_hash_sets_sign_bit() {
        // This string's forward hash is exactly i32::MIN.
        let seed = Seed::from_identifier("polygenelubricants");
        assert_eq!(seed.0, -9_223_372_034_574_271_552);
    }

    #[test]
    fn test_from_identifier_reverses_utf16_code_units() {
        // The emoji is a surrogate pair; reversal works on code units.
        assert_eq!(
            Seed::from_identifier("a\u{1F600}").0,
            8_014_909_394_357_700
        );
    }

    #[test]
    fn test_random_identifier_is_32_hex_chars() {
        let id = random_identifier();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_seed_serializes_as_plain_number() {
        let json = serde_json::to_string(&Seed(42)).unwrap();
        assert_eq!(json, "42");
    }
}
