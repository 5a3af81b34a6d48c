use thiserror::Error;

use crate::{
    identity::IdentityError, ledger::LedgerError, storage::StorageError,
    workflow::OperationKind,
};

/// Error outputs from `Docvault` operations.
///
/// Every workflow operation terminates with exactly one of these or with its success value.
/// Collaborator messages are carried in `reason` unchanged.
#[derive(Debug, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum VaultError {
    /// The presented input is not valid for the requested operation. No collaborator was contacted.
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The input that failed validation.
        attribute: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The operation requires a connected wallet identity.
    #[error("not_connected")]
    NotConnected,
    /// No wallet provider is available to connect to.
    #[error("no_wallet_provider")]
    NoWalletProvider,
    /// The wallet provider declined the connection.
    #[error("connection_rejected: {reason}")]
    ConnectionRejected {
        /// Reason reported by the provider.
        reason: String,
    },
    /// The storage service could not be reached or refused the credentials.
    #[error("storage_unavailable: {reason}")]
    StorageUnavailable {
        /// Transport or authentication failure details.
        reason: String,
    },
    /// The storage service rejected the upload (e.g. size or type limits).
    #[error("storage_rejected: {reason}")]
    StorageRejected {
        /// HTTP status returned by the service, if any.
        status: Option<u16>,
        /// Rejection details returned by the service.
        reason: String,
    },
    /// The ledger could not be reached.
    #[error("ledger_unavailable: {reason}")]
    LedgerUnavailable {
        /// Connectivity failure details.
        reason: String,
    },
    /// The ledger rejected the request (policy or permission violation, revert).
    #[error("ledger_rejected: {reason}")]
    LedgerRejected {
        /// Revert reason or rejection message surfaced by the ledger.
        reason: String,
    },
    /// The document is not registered on the ledger.
    #[error("document_not_found: {document_id}")]
    DocumentNotFound {
        /// Hex representation of the document identifier.
        document_id: String,
    },
    /// The document identifier is already registered on the ledger.
    #[error("document_already_registered: {document_id}")]
    DocumentAlreadyRegistered {
        /// Hex representation of the document identifier.
        document_id: String,
        /// Pointer uploaded by this attempt, orphaned on storage.
        pointer: Option<String>,
    },
    /// Upload succeeded but ledger registration failed. The uploaded content is orphaned;
    /// retry registration with `pointer` instead of uploading again.
    #[error("registration_failed_after_upload ({pointer}): {reason}")]
    RegistrationFailedAfterUpload {
        /// Content pointer of the already uploaded file.
        pointer: String,
        /// Ledger failure details.
        reason: String,
    },
    /// The ledger failed while checking access. Distinct from a legitimate denial.
    #[error("identity_check_failed: {reason}")]
    IdentityCheckFailed {
        /// Ledger failure details.
        reason: String,
    },
    /// An operation of the same kind is still in flight.
    #[error("operation_in_progress: {operation}")]
    OperationInProgress {
        /// The operation kind that is busy.
        operation: OperationKind,
    },
    /// The provided configuration is invalid.
    #[error("configuration_error: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },
}

impl VaultError {
    pub(crate) fn invalid_input(attribute: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the content pointer of an upload that was orphaned by this failure, if any.
    ///
    /// A caller can hand it to `VaultWorkflow::retry_registration` to skip uploading again.
    #[must_use]
    pub fn reusable_pointer(&self) -> Option<&str> {
        match self {
            Self::RegistrationFailedAfterUpload { pointer, .. } => Some(pointer),
            Self::DocumentAlreadyRegistered { pointer, .. } => pointer.as_deref(),
            _ => None,
        }
    }
}

impl From<StorageError> for VaultError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Unavailable(reason) => Self::StorageUnavailable { reason },
            StorageError::Rejected { status, reason } => {
                Self::StorageRejected { status, reason }
            }
        }
    }
}

impl From<LedgerError> for VaultError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unavailable(reason) => Self::LedgerUnavailable { reason },
            LedgerError::Rejected(reason) => Self::LedgerRejected { reason },
            LedgerError::DocumentNotFound(id) => Self::DocumentNotFound {
                document_id: id.to_hex_string(),
            },
            LedgerError::AlreadyRegistered(id) => Self::DocumentAlreadyRegistered {
                document_id: id.to_hex_string(),
                pointer: None,
            },
        }
    }
}

impl From<IdentityError> for VaultError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::NoWalletProvider => Self::NoWalletProvider,
            IdentityError::ConnectionRejected(reason) => {
                Self::ConnectionRejected { reason }
            }
        }
    }
}
