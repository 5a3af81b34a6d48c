use alloy_primitives::Address;
use std::str::FromStr;

use crate::{error::VaultError, identity::Identity};

/// Parses a single wallet address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and all-uppercase addresses are
/// accepted as is; mixed-case addresses must carry a valid EIP-55 checksum.
#[must_use]
pub fn parse_identity(candidate: &str) -> Option<Identity> {
    let candidate = candidate.trim();
    let digits = candidate.strip_prefix("0x").unwrap_or(candidate);
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let address = Address::from_str(digits).ok()?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != format!("0x{digits}") {
        return None;
    }

    Some(address)
}

/// Splits a free-form list of addresses on commas, spaces and newlines and keeps the valid ones.
///
/// Other whitespace does not separate entries, so tab-separated addresses form one malformed entry.
/// Malformed entries are dropped silently. Duplicates are removed, keeping the first occurrence.
#[must_use]
pub fn parse_identity_list(input: &str) -> Vec<Identity> {
    let mut identities: Vec<Identity> = Vec::new();
    for candidate in input
        .split([',', ' ', '\n'])
        .filter(|s| !s.is_empty())
    {
        if let Some(identity) = parse_identity(candidate) {
            if !identities.contains(&identity) {
                identities.push(identity);
            }
        }
    }
    identities
}

/// Parses an address supplied for a specific attribute of an operation.
///
/// # Errors
/// Returns `VaultError::InvalidInput` naming `attr` if the value is empty or not a valid address.
pub(crate) fn parse_required_identity(
    s: &str,
    attr: &'static str,
) -> Result<Identity, VaultError> {
    if s.trim().is_empty() {
        return Err(VaultError::invalid_input(attr, "address must not be empty"));
    }
    parse_identity(s).ok_or_else(|| VaultError::invalid_input(attr, "Invalid address"))
}
