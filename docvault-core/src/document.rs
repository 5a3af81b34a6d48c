use serde::{Deserialize, Serialize};

use crate::{
    document_id::{derive_id, trim_name, DocumentId},
    error::VaultError,
};

/// A human supplied document name that has passed validation.
///
/// Names are case and surrounding-whitespace insensitive for identity purposes. The name itself never
/// reaches the ledger; only its [`DocumentId`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName(String);

impl DocumentName {
    /// Validates a raw document name.
    ///
    /// # Errors
    /// Returns `VaultError::InvalidInput` if the name is empty or only whitespace and byte order marks.
    pub fn parse(raw: &str) -> Result<Self, VaultError> {
        if trim_name(raw).is_empty() {
            return Err(VaultError::invalid_input(
                "document_name",
                "document name must not be empty",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// The name as supplied by the user.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without surrounding whitespace and byte order marks.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        trim_name(&self.0)
    }

    /// The canonical identifier for this name.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        derive_id(&self.0)
    }
}

/// Opaque handle returned by content-addressed storage for uploaded bytes (an IPFS CID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentPointer(String);

impl ContentPointer {
    /// Wraps a pointer handed out by the storage service.
    #[must_use]
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// The raw pointer value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the pointer is empty. Ledgers report unregistered documents with an empty pointer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ContentPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File contents selected for vaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    /// File name sent along with the upload.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    /// Creates a file without a declared content type.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Sets the MIME type of the file.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// A file with no bytes counts as no file selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Metadata attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadMetadata {
    /// Display name recorded by the pinning service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
