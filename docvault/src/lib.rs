//! Bindings entry point for `docvault-core`. Builds the library with its `UniFFI` scaffolding enabled.

pub use docvault_core::*;

/// Result of a vault operation.
pub type VaultResult<T, E = VaultError> = std::result::Result<T, E>;

/// Derives the ledger identifier of a document name as a `0x`-prefixed hex string.
///
/// Hosts use this to show or compare identifiers without holding a 256-bit integer type.
#[must_use]
#[uniffi::export]
pub fn document_id_for(name: &str) -> String {
    derive_id(name).to_hex_string()
}

uniffi::setup_scaffolding!("docvault");
