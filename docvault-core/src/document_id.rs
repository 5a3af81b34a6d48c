use std::ops::Deref;

use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// The canonical on-ledger identifier of a document.
///
/// Derived from a human readable document name with [`derive_id`]: the name is trimmed (whitespace and
/// byte order marks) and lowercased,
/// hashed with Keccak-256 and the 32 byte digest is read as a big-endian `uint256`. Names that normalize
/// identically always map to the same identifier; there is no way back from an identifier to a name.
///
/// When sent over JSON or shown to users the value is a `0x`-prefixed hex string padded to 32 bytes.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct DocumentId(pub U256);

impl DocumentId {
    /// Outputs a hex string representation of the identifier padded to 32 bytes (plus two bytes for the `0x` prefix).
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        format!("{:#066x}", self.0)
    }

    /// Attempts to parse a hex string as a `DocumentId`.
    ///
    /// # Errors
    /// Will return `VaultError::InvalidInput` if the input is not a hex number of up to 256 bits.
    pub fn try_from_hex_string(hex_string: &str) -> Result<Self, VaultError> {
        let hex_string = hex_string.trim().trim_start_matches("0x");

        let number = U256::from_str_radix(hex_string, 16).map_err(|e| {
            VaultError::invalid_input("document_id", e.to_string())
        })?;

        Ok(Self(number))
    }
}

/// Maps a document name to its canonical [`DocumentId`].
///
/// Total and deterministic. Callers reject empty or whitespace-only names before deriving;
/// see [`crate::DocumentName`].
#[must_use]
pub fn derive_id(name: &str) -> DocumentId {
    let normalized = trim_name(name).to_lowercase();
    let digest = keccak256(normalized.as_bytes());
    DocumentId(U256::from_be_bytes(digest.0))
}

/// Strips surrounding whitespace and byte order marks from a document name.
///
/// Names pasted from documents often start with U+FEFF, which `str::trim` keeps.
pub(crate) fn trim_name(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

impl From<DocumentId> for U256 {
    fn from(val: DocumentId) -> Self {
        val.0
    }
}

impl From<U256> for DocumentId {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Deref for DocumentId {
    type Target = U256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::try_from_hex_string(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use alloy_primitives::uint;
    use test_case::test_case;

    #[test]
    fn test_derive_id_matches_keccak_of_normalized_name() {
        assert_eq!(
            derive_id("foo"),
            DocumentId(uint!(
                0x41b1a0649752af1b28b3dc29a1556eee781e4a4c3a1f7f53f90fa834de098c4d_U256
            ))
        );
    }

    #[test_case(" Foo "; "surrounding spaces")]
    #[test_case("FOO"; "upper case")]
    #[test_case("\tfoo\n"; "tabs and newlines")]
    #[test_case("fOo"; "mixed case")]
    #[test_case("\u{feff}foo"; "leading byte order mark")]
    #[test_case(" \u{feff} FOO\u{feff}"; "byte order marks and spaces")]
    fn test_derive_id_is_case_and_whitespace_insensitive(name: &str) {
        assert_eq!(derive_id(name), derive_id("foo"));
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert_ne!(derive_id("contract v1"), derive_id("contractv1"));
    }

    #[test]
    fn test_derive_id_has_no_collisions_over_sample() {
        let ids = (0..2_000)
            .map(|i| derive_id(&format!("document-{i}")))
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn test_hex_string_roundtrip() {
        let id = derive_id("contract-v1");
        let hex = id.to_hex_string();
        assert_eq!(hex.len(), 66);
        assert_eq!(DocumentId::try_from_hex_string(&hex).unwrap(), id);
    }

    #[test]
    fn test_small_values_are_padded() {
        assert_eq!(
            DocumentId(U256::from(42)).to_hex_string(),
            "0x000000000000000000000000000000000000000000000000000000000000002a"
        );
    }

    #[test]
    fn test_invalid_hex_string() {
        assert!(DocumentId::try_from_hex_string("0xZZZZ").is_err());
        assert!(DocumentId::try_from_hex_string("not a hex string").is_err());
    }

    #[test]
    fn test_json_serializing() {
        let id = DocumentId(U256::from(1));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(
            json,
            "\"0x0000000000000000000000000000000000000000000000000000000000000001\""
        );
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
