//! The vault workflow: create-and-register, grant, revoke and check-and-reveal.
//!
//! Each operation is a short-lived saga over the session's collaborators. The workflow keeps no state
//! between operations apart from the busy flag of each operation kind; grant sets are always read from
//! the ledger.

use std::future::Future;

use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;

use crate::{
    access_policy::AccessPolicy,
    document::{ContentPointer, DocumentFile, DocumentName, UploadMetadata},
    document_id::DocumentId,
    error::VaultError,
    identity::{Identity, IdentityPort},
    ledger::{LedgerError, LedgerPort, LedgerReceipt},
    primitives::{parse_identity_list, parse_required_identity},
    session::Session,
    storage::StoragePort,
};

mod in_flight;
mod status;

use in_flight::InFlight;
pub use status::{Stage, StatusEvent};

/// Status events buffered per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Failure reason reported when an operation is dropped before it completes.
pub const CANCELLED: &str = "cancelled";

/// The user-facing operations of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Upload a file and register it on the ledger.
    CreateAndRegister,
    /// Grant viewers access to a document.
    GrantAccess,
    /// Revoke a viewer's access to a document.
    RevokeAccess,
    /// Check the connected identity's access and reveal the document URL.
    CheckAndReveal,
}

/// A document registered on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Identifier the document was registered under.
    pub document_id: DocumentId,
    /// Where the file content lives.
    pub pointer: ContentPointer,
    /// Ledger confirmation of the registration.
    pub receipt: LedgerReceipt,
}

/// Viewers granted access to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantOutcome {
    /// Identifier of the document.
    pub document_id: DocumentId,
    /// The well-formed identities sent to the ledger.
    pub granted: Vec<Identity>,
    /// Ledger confirmation of the grant.
    pub receipt: LedgerReceipt,
}

/// A viewer's access revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeOutcome {
    /// Identifier of the document.
    pub document_id: DocumentId,
    /// The identity whose access was revoked.
    pub target: Identity,
    /// Ledger confirmation of the revocation.
    pub receipt: LedgerReceipt,
}

/// Result of checking the connected identity against a document's grant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access is granted; the document can be shown from `url`.
    Revealed {
        /// Retrieval URL of the content.
        url: String,
        /// Content pointer registered for the document.
        pointer: ContentPointer,
    },
    /// The identity is not a grantee. This is a normal outcome, not an error.
    Denied,
}

/// Orchestrates the vault operations over a [`Session`].
///
/// Operations of different kinds may run concurrently. Invoking a kind that is still in flight fails
/// immediately with `VaultError::OperationInProgress` and leaves the running instance untouched.
pub struct VaultWorkflow<S, L, I> {
    session: Session<S, L, I>,
    in_flight: InFlight,
    events: broadcast::Sender<StatusEvent>,
}

impl<S, L, I> VaultWorkflow<S, L, I>
where
    S: StoragePort,
    L: LedgerPort,
    I: IdentityPort,
{
    /// Creates a workflow over `session`.
    #[must_use]
    pub fn new(session: Session<S, L, I>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session,
            in_flight: InFlight::default(),
            events,
        }
    }

    /// The session this workflow runs on.
    #[must_use]
    pub const fn session(&self) -> &Session<S, L, I> {
        &self.session
    }

    /// Subscribes to status events of all subsequent operations.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// Whether an operation of `kind` is in flight. Controls triggering `kind` should be disabled while
    /// this is true.
    #[must_use]
    pub fn is_busy(&self, kind: OperationKind) -> bool {
        self.in_flight.is_busy(kind)
    }

    /// Connects the session's wallet.
    ///
    /// # Errors
    /// `VaultError::NoWalletProvider` or `VaultError::ConnectionRejected`.
    pub async fn connect(&self) -> Result<Identity, VaultError> {
        let identity = self.session.identity.connect().await.map_err(|e| {
            log::warn!("wallet connection failed: {e}");
            VaultError::from(e)
        })?;
        log::info!("wallet connected: {identity}");
        Ok(identity)
    }

    /// Uploads `file` and registers it on the ledger under the identifier derived from `name`.
    ///
    /// Reports success only after the ledger has confirmed the registration. If the upload fails the
    /// ledger is never contacted. If registration fails after a successful upload the error is
    /// `VaultError::RegistrationFailedAfterUpload`, carrying the pointer for
    /// [`VaultWorkflow::retry_registration`].
    ///
    /// # Errors
    /// `InvalidInput` for a blank name or empty file, `NotConnected` without a wallet, storage errors
    /// from the upload, and the registration errors described above.
    pub async fn create_and_register(
        &self,
        name: &str,
        file: &DocumentFile,
        policy: AccessPolicy,
    ) -> Result<Registration, VaultError> {
        self.run(
            OperationKind::CreateAndRegister,
            self.upload_and_register(name, file, policy),
        )
        .await
    }

    /// Registers content that is already uploaded, skipping the upload step.
    ///
    /// This is the retry path for `VaultError::RegistrationFailedAfterUpload`. It shares the busy flag of
    /// [`OperationKind::CreateAndRegister`].
    ///
    /// # Errors
    /// `InvalidInput` for a blank name or pointer, `NotConnected` without a wallet, and the same
    /// registration errors as [`VaultWorkflow::create_and_register`].
    pub async fn retry_registration(
        &self,
        name: &str,
        pointer: &str,
        policy: AccessPolicy,
    ) -> Result<Registration, VaultError> {
        self.run(
            OperationKind::CreateAndRegister,
            self.register_uploaded(name, pointer, policy),
        )
        .await
    }

    /// Grants every well-formed address in `identity_list` access to the document named `name`.
    ///
    /// The list may be separated by commas, spaces or newlines. Malformed entries are dropped from the
    /// request; the operation succeeds as long as at least one valid address remains.
    ///
    /// # Errors
    /// `InvalidInput` for a blank name or no valid address, `NotConnected` without a wallet, and ledger
    /// errors.
    pub async fn grant_access(
        &self,
        name: &str,
        identity_list: &str,
    ) -> Result<GrantOutcome, VaultError> {
        self.run(OperationKind::GrantAccess, self.grant(name, identity_list))
            .await
    }

    /// Revokes `target`'s access to the document named `name`. Revoking a non-grantee succeeds.
    ///
    /// # Errors
    /// `InvalidInput` for a blank name or malformed target, `NotConnected` without a wallet, and ledger
    /// errors.
    pub async fn revoke_access(
        &self,
        name: &str,
        target: &str,
    ) -> Result<RevokeOutcome, VaultError> {
        self.run(OperationKind::RevokeAccess, self.revoke(name, target))
            .await
    }

    /// Checks whether the connected identity may view the document named `name` and, if so, resolves its
    /// retrieval URL.
    ///
    /// # Errors
    /// `InvalidInput` for a blank name, `NotConnected` without a wallet, and `IdentityCheckFailed` for any
    /// ledger failure while checking or resolving. A missing grant is [`AccessDecision::Denied`], not an
    /// error.
    pub async fn check_and_reveal(&self, name: &str) -> Result<AccessDecision, VaultError> {
        self.run(OperationKind::CheckAndReveal, self.check(name))
            .await
    }

    /// Runs one operation: claims its busy flag, reports start, awaits the task and reports exactly one
    /// terminal event. If the returned future is dropped before the task completes, the terminal event is
    /// `Failed` with reason [`CANCELLED`]. The flag is released when this returns or is dropped.
    async fn run<T, F>(&self, operation: OperationKind, task: F) -> Result<T, VaultError>
    where
        T: Send,
        F: Future<Output = Result<T, VaultError>> + Send,
    {
        let _guard = self.in_flight.try_begin(operation).inspect_err(|_| {
            log::warn!("{operation} is already in progress");
        })?;

        log::info!("{operation} started");
        self.emit(StatusEvent::Started { operation });
        let completion = Completion::new(operation, &self.events);

        let result = task.await;
        completion.finish(&result);
        result
    }

    async fn upload_and_register(
        &self,
        name: &str,
        file: &DocumentFile,
        policy: AccessPolicy,
    ) -> Result<Registration, VaultError> {
        let name = DocumentName::parse(name)?;
        if file.is_empty() {
            return Err(VaultError::invalid_input("file", "a file must be selected"));
        }
        self.require_identity()?;
        let document_id = name.id();

        self.progress(OperationKind::CreateAndRegister, Stage::Uploading);
        let metadata = UploadMetadata {
            name: Some(name.trimmed().to_string()),
        };
        let pointer = self.session.storage.upload(file, &metadata).await?;
        log::debug!("uploaded {} as {pointer}", file.file_name);

        self.register(document_id, pointer, policy).await
    }

    async fn register_uploaded(
        &self,
        name: &str,
        pointer: &str,
        policy: AccessPolicy,
    ) -> Result<Registration, VaultError> {
        let name = DocumentName::parse(name)?;
        let pointer = ContentPointer::new(pointer.trim());
        if pointer.is_empty() {
            return Err(VaultError::invalid_input(
                "pointer",
                "content pointer must not be empty",
            ));
        }
        self.require_identity()?;

        self.register(name.id(), pointer, policy).await
    }

    async fn register(
        &self,
        document_id: DocumentId,
        pointer: ContentPointer,
        policy: AccessPolicy,
    ) -> Result<Registration, VaultError> {
        self.progress(OperationKind::CreateAndRegister, Stage::Registering);

        match self
            .session
            .ledger
            .register_document(document_id, &pointer, policy)
            .await
        {
            Ok(receipt) => Ok(Registration {
                document_id,
                pointer,
                receipt,
            }),
            Err(LedgerError::AlreadyRegistered(id)) => {
                log::warn!("content {pointer} is orphaned: {id} is already registered");
                Err(VaultError::DocumentAlreadyRegistered {
                    document_id: id.to_hex_string(),
                    pointer: Some(pointer.to_string()),
                })
            }
            Err(error) => {
                log::warn!(
                    "content {pointer} is orphaned: registering {document_id} failed: {error}"
                );
                Err(VaultError::RegistrationFailedAfterUpload {
                    pointer: pointer.to_string(),
                    reason: error.to_string(),
                })
            }
        }
    }

    async fn grant(
        &self,
        name: &str,
        identity_list: &str,
    ) -> Result<GrantOutcome, VaultError> {
        let name = DocumentName::parse(name)?;
        let identities = parse_identity_list(identity_list);
        if identities.is_empty() {
            return Err(VaultError::invalid_input(
                "identities",
                "no valid wallet address given",
            ));
        }
        self.require_identity()?;
        let document_id = name.id();

        self.progress(OperationKind::GrantAccess, Stage::Granting);
        let receipt = self.session.ledger.grant(&identities, document_id).await?;

        Ok(GrantOutcome {
            document_id,
            granted: identities,
            receipt,
        })
    }

    async fn revoke(&self, name: &str, target: &str) -> Result<RevokeOutcome, VaultError> {
        let name = DocumentName::parse(name)?;
        let target = parse_required_identity(target, "target")?;
        self.require_identity()?;
        let document_id = name.id();

        self.progress(OperationKind::RevokeAccess, Stage::Revoking);
        let receipt = self.session.ledger.revoke(target, document_id).await?;

        Ok(RevokeOutcome {
            document_id,
            target,
            receipt,
        })
    }

    async fn check(&self, name: &str) -> Result<AccessDecision, VaultError> {
        let name = DocumentName::parse(name)?;
        let viewer = self.require_identity()?;
        let document_id = name.id();

        self.progress(OperationKind::CheckAndReveal, Stage::Verifying);
        let allowed = self
            .session
            .ledger
            .can_access(viewer, document_id)
            .await
            .map_err(identity_check_failed)?;
        if !allowed {
            log::info!("{viewer} is not a grantee of {document_id}");
            return Ok(AccessDecision::Denied);
        }

        self.progress(OperationKind::CheckAndReveal, Stage::Resolving);
        let pointer = self
            .session
            .ledger
            .resolve_pointer(document_id)
            .await
            .map_err(identity_check_failed)?;
        let url = self.session.storage.resolve(&pointer);

        Ok(AccessDecision::Revealed { url, pointer })
    }

    fn require_identity(&self) -> Result<Identity, VaultError> {
        self.session.identity.current().ok_or(VaultError::NotConnected)
    }

    fn progress(&self, operation: OperationKind, stage: Stage) {
        log::debug!("{operation}: {stage}");
        self.emit(StatusEvent::Progress { operation, stage });
    }

    fn emit(&self, event: StatusEvent) {
        emit(&self.events, event);
    }
}

/// Reports the terminal event of a running operation, or its cancellation when dropped unfinished.
struct Completion<'a> {
    operation: OperationKind,
    events: &'a broadcast::Sender<StatusEvent>,
    finished: bool,
}

impl<'a> Completion<'a> {
    const fn new(operation: OperationKind, events: &'a broadcast::Sender<StatusEvent>) -> Self {
        Self {
            operation,
            events,
            finished: false,
        }
    }

    fn finish<T>(mut self, result: &Result<T, VaultError>) {
        self.finished = true;
        let operation = self.operation;
        match result {
            Ok(_) => {
                log::info!("{operation} succeeded");
                emit(self.events, StatusEvent::Succeeded { operation });
            }
            Err(error) => {
                log::warn!("{operation} failed: {error}");
                emit(
                    self.events,
                    StatusEvent::Failed {
                        operation,
                        reason: error.to_string(),
                    },
                );
            }
        }
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let operation = self.operation;
        log::warn!("{operation} was cancelled");
        emit(
            self.events,
            StatusEvent::Failed {
                operation,
                reason: CANCELLED.to_string(),
            },
        );
    }
}

fn emit(events: &broadcast::Sender<StatusEvent>, event: StatusEvent) {
    // No subscribers is fine.
    let _ = events.send(event);
}

fn identity_check_failed(error: LedgerError) -> VaultError {
    VaultError::IdentityCheckFailed {
        reason: error.to_string(),
    }
}
