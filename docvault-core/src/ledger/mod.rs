//! The authorization ledger: document registrations and grant sets.
//!
//! All durable state lives behind [`LedgerPort`]. The workflow never caches grant sets; each check, grant
//! and revoke goes to the ledger.

use std::future::Future;

use alloy_primitives::B256;
use serde::Serialize;
use thiserror::Error;

use crate::{
    access_policy::AccessPolicy, document::ContentPointer, document_id::DocumentId,
    identity::Identity,
};

mod chain;
mod memory;

pub use chain::ChainLedger;
pub use memory::InMemoryLedger;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised by the authorization ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Connectivity to the ledger was lost.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused the request (policy or permission violation).
    #[error("ledger rejected request: {0}")]
    Rejected(String),

    /// No document is registered under the identifier.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// A document is already registered under the identifier.
    #[error("document already registered: {0}")]
    AlreadyRegistered(DocumentId),
}

/// Confirmation that a ledger mutation reached finality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerReceipt {
    /// Hash of the transaction carrying the mutation.
    pub transaction_hash: B256,
    /// Block the transaction was included in, when known.
    pub block_number: Option<u64>,
}

/// Ledger interface used by the vault workflow.
///
/// Mutations resolve only once the ledger has confirmed them, not when they are merely submitted.
pub trait LedgerPort: Send + Sync {
    /// Registers a document under `id` pointing at `pointer` with the given access policy.
    ///
    /// # Errors
    ///
    /// `LedgerError::AlreadyRegistered` if the identifier is taken, otherwise `Unavailable` or `Rejected`.
    fn register_document(
        &self,
        id: DocumentId,
        pointer: &ContentPointer,
        policy: AccessPolicy,
    ) -> impl Future<Output = LedgerResult<LedgerReceipt>> + Send;

    /// Grants read access on `doc` to every identity in `identities`. Granting an existing grantee is a no-op.
    ///
    /// # Errors
    ///
    /// `LedgerError::Unavailable` or `LedgerError::Rejected`.
    fn grant(
        &self,
        identities: &[Identity],
        doc: DocumentId,
    ) -> impl Future<Output = LedgerResult<LedgerReceipt>> + Send;

    /// Revokes read access on `doc` from `identity`. Revoking a non-grantee is a no-op.
    ///
    /// # Errors
    ///
    /// `LedgerError::Unavailable` or `LedgerError::Rejected`.
    fn revoke(
        &self,
        identity: Identity,
        doc: DocumentId,
    ) -> impl Future<Output = LedgerResult<LedgerReceipt>> + Send;

    /// Whether `identity` may read `doc`. Read-only.
    ///
    /// # Errors
    ///
    /// `LedgerError::Unavailable` or `LedgerError::Rejected`.
    fn can_access(
        &self,
        identity: Identity,
        doc: DocumentId,
    ) -> impl Future<Output = LedgerResult<bool>> + Send;

    /// The content pointer registered for `doc`. Read-only.
    ///
    /// # Errors
    ///
    /// `LedgerError::DocumentNotFound` if `doc` is not registered.
    fn resolve_pointer(
        &self,
        doc: DocumentId,
    ) -> impl Future<Output = LedgerResult<ContentPointer>> + Send;
}
