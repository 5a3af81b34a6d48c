//! Content-addressed storage for vaulted files.

use std::future::Future;

use thiserror::Error;

use crate::document::{ContentPointer, DocumentFile, UploadMetadata};

mod pinata;
pub use pinata::PinataStorage;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the storage collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Transport or authentication failure.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The service refused the upload (size/type limits, malformed request).
    #[error("storage rejected upload: {reason}")]
    Rejected {
        /// HTTP status returned by the service, if any.
        status: Option<u16>,
        /// Body or message returned by the service.
        reason: String,
    },
}

/// Storage interface used by the vault workflow.
pub trait StoragePort: Send + Sync {
    /// Uploads and pins the file. Once this resolves the bytes are retrievable at the returned pointer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` on transport or authentication failure and
    /// `StorageError::Rejected` when the service refuses the file.
    fn upload(
        &self,
        file: &DocumentFile,
        metadata: &UploadMetadata,
    ) -> impl Future<Output = StorageResult<ContentPointer>> + Send;

    /// Builds the retrieval URL for a pointer. Does not verify that the content exists.
    fn resolve(&self, pointer: &ContentPointer) -> String;
}
