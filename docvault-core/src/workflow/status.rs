use serde::Serialize;
use strum::Display;

use super::OperationKind;

/// Intermediate step of a running operation, suitable for a progress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Uploading the file to storage.
    Uploading,
    /// Waiting for the ledger to confirm the registration.
    Registering,
    /// Waiting for the ledger to confirm a grant.
    Granting,
    /// Waiting for the ledger to confirm a revocation.
    Revoking,
    /// Asking the ledger whether the connected identity may read the document.
    Verifying,
    /// Looking up the content pointer of an accessible document.
    Resolving,
}

/// Lifecycle notification for one operation.
///
/// Every admitted operation emits `Started`, any number of `Progress` events and then exactly one of
/// `Succeeded` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// The operation was admitted and its control should show as busy.
    Started {
        /// Operation kind.
        operation: OperationKind,
    },
    /// The operation reached a new stage.
    Progress {
        /// Operation kind.
        operation: OperationKind,
        /// Stage reached.
        stage: Stage,
    },
    /// The operation completed.
    Succeeded {
        /// Operation kind.
        operation: OperationKind,
    },
    /// The operation failed.
    Failed {
        /// Operation kind.
        operation: OperationKind,
        /// Error message, passed through from the collaborator where there is one.
        reason: String,
    },
}

impl StatusEvent {
    /// The operation this event belongs to.
    #[must_use]
    pub const fn operation(&self) -> OperationKind {
        match self {
            Self::Started { operation }
            | Self::Progress { operation, .. }
            | Self::Succeeded { operation }
            | Self::Failed { operation, .. } => *operation,
        }
    }

    /// Whether this is the final event of its operation.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}
