//! Content-derived identity keys for catalog records
//!
//! A key is the big-endian integer reading of a 16-byte BLAKE3 extended
//! output computed over the concatenated UTF-8 bytes of the input fields.
//! No separator is hashed between fields, so `("ab", "c")` and `("a", "bc")`
//! produce the same key. Callers fix the field order and count per use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digest bytes read from the hash stream.
pub const KEY_DIGEST_BYTES: usize = 16;

/// 128-bit record fingerprint, stored as decimal text outside the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IdentityKey(u128);

impl IdentityKey {
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u128>().map(Self)
    }
}

impl From<IdentityKey> for String {
    fn from(key: IdentityKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Stateless generator for [`IdentityKey`] values
pub struct KeyGenerator;

impl KeyGenerator {
    /// Hash `fields` in order and return the digest as an unsigned integer.
    pub fn generate<S: AsRef<str>>(fields: &[S]) -> IdentityKey {
        let mut hasher = blake3::Hasher::new();
        for field in fields {
            hasher.update(field.as_ref().as_bytes());
        }

        let mut digest = [0_u8; KEY_DIGEST_BYTES];
        hasher.finalize_xof().fill(&mut digest);
        IdentityKey(u128::from_be_bytes(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_is_deterministic() {
        let fields = ["20250301", "The Godfather", "Crime", "1972"];
        assert_eq!(KeyGenerator::generate(&fields), KeyGenerator::generate(&fields));
    }

    #[test]
    fn test_field_boundaries_are_not_hashed() {
        assert_eq!(
            KeyGenerator::generate(&["ab", "c"]),
            KeyGenerator::generate(&["a", "bc"])
        );
        assert_eq!(
            KeyGenerator::generate(&["abc"]),
            KeyGenerator::generate(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_field_order_changes_key() {
        assert_ne!(
            KeyGenerator::generate(&["Crime", "1972"]),
            KeyGenerator::generate(&["1972", "Crime"])
        );
    }

    #[test]
    fn test_empty_input_is_accepted() {
        let empty: [&str; 0] = [];
        let a = KeyGenerator::generate(&empty);
        let b = KeyGenerator::generate(&["", ""]);
        assert_eq!(a, b);
        assert_eq!(a, KeyGenerator::generate(&[""]));
    }

    #[test]
    fn test_key_uses_full_width() {
        // 16 random bytes: the top byte is zero for only ~1/256 of inputs.
        let wide = (0..32)
            .map(|i| KeyGenerator::generate(&[i.to_string()]))
            .filter(|k| k.as_u128() > u128::MAX >> 8)
            .count();
        assert!(wide > 0);
    }

    #[test]
    fn test_decimal_text_round_trip() {
        let key = KeyGenerator::generate(&["20250301", "Se7en", "Crime", "1995"]);
        let text = key.to_string();
        assert!(text.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(text.parse::<IdentityKey>().unwrap(), key);
    }

    proptest! {
        #[test]
        fn prop_same_fields_same_key(fields in proptest::collection::vec(".*", 0..6)) {
            prop_assert_eq!(KeyGenerator::generate(&fields), KeyGenerator::generate(&fields));
        }
    }
}
