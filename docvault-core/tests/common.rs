#![allow(dead_code)]

//! Common test utilities shared across integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use alloy_primitives::{address, Address};
use docvault_core::{
    ledger::{LedgerError, LedgerResult},
    storage::{StorageError, StorageResult},
    AccessPolicy, ContentPointer, DocumentFile, DocumentId, Identity, IdentityPort,
    InMemoryLedger, LedgerPort, LedgerReceipt, Session, StoragePort, UploadMetadata,
    VaultWorkflow,
};
use docvault_core::identity::IdentityError;
use tokio::sync::Notify;

/// Gateway base the fake storage resolves pointers against.
pub const GATEWAY: &str = "https://gateway.test/ipfs/";

/// Wallet that owns the documents in most tests.
pub const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// First viewer wallet.
pub const ALICE: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
/// Second viewer wallet.
pub const BOB: Address = address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

static TRACING: Once = Once::new();

/// Routes `log` output through a test subscriber. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Storage double that counts uploads, can fail on demand and can be held mid-upload.
#[derive(Clone, Default)]
pub struct FakeStorage {
    inner: Arc<StorageInner>,
}

#[derive(Default)]
struct StorageInner {
    pointer: Mutex<Option<String>>,
    failure: Mutex<Option<StorageError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    uploads: AtomicUsize,
    resolves: AtomicUsize,
    last_metadata: Mutex<Option<UploadMetadata>>,
}

impl FakeStorage {
    /// Storage whose uploads all return `pointer`.
    pub fn returning(pointer: &str) -> Self {
        let storage = Self::default();
        *storage.inner.pointer.lock().unwrap() = Some(pointer.to_string());
        storage
    }

    /// Every later upload fails with `error`.
    pub fn fail_with(&self, error: StorageError) {
        *self.inner.failure.lock().unwrap() = Some(error);
    }

    /// Uploads wait for a notification on the returned handle before completing.
    pub fn hold_uploads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.inner.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Uploads complete immediately again.
    pub fn release_uploads(&self) {
        *self.inner.gate.lock().unwrap() = None;
    }

    /// Number of uploads started.
    pub fn uploads(&self) -> usize {
        self.inner.uploads.load(Ordering::SeqCst)
    }

    /// Number of pointers resolved to URLs.
    pub fn resolves(&self) -> usize {
        self.inner.resolves.load(Ordering::SeqCst)
    }

    /// Metadata of the most recent upload.
    pub fn last_metadata(&self) -> Option<UploadMetadata> {
        self.inner.last_metadata.lock().unwrap().clone()
    }
}

impl StoragePort for FakeStorage {
    async fn upload(
        &self,
        file: &DocumentFile,
        metadata: &UploadMetadata,
    ) -> StorageResult<ContentPointer> {
        let count = self.inner.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.last_metadata.lock().unwrap() = Some(metadata.clone());

        let gate = self.inner.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(error) = self.inner.failure.lock().unwrap().clone() {
            return Err(error);
        }
        let pointer = self
            .inner
            .pointer
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("Qm{count}{}", file.bytes.len()));
        Ok(ContentPointer::new(pointer))
    }

    fn resolve(&self, pointer: &ContentPointer) -> String {
        self.inner.resolves.fetch_add(1, Ordering::SeqCst);
        format!("{GATEWAY}{pointer}")
    }
}

/// A `register_document` call as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCall {
    /// Identifier registered.
    pub id: DocumentId,
    /// Content pointer registered.
    pub pointer: ContentPointer,
    /// Policy registered.
    pub policy: AccessPolicy,
}

/// Ledger double that records calls and forwards them to an [`InMemoryLedger`].
#[derive(Clone, Default)]
pub struct RecordingLedger {
    inner: Arc<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    ledger: InMemoryLedger,
    register_calls: Mutex<Vec<RegisterCall>>,
    grant_calls: Mutex<Vec<Vec<Identity>>>,
    revoke_calls: AtomicUsize,
    can_access_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
    register_failure: Mutex<Option<LedgerError>>,
    read_failure: Mutex<Option<LedgerError>>,
}

impl RecordingLedger {
    /// The next registration fails with `error`.
    pub fn fail_next_register(&self, error: LedgerError) {
        *self.inner.register_failure.lock().unwrap() = Some(error);
    }

    /// Every read fails with `error`.
    pub fn fail_reads(&self, error: LedgerError) {
        *self.inner.read_failure.lock().unwrap() = Some(error);
    }

    /// Every registration attempt, in order.
    pub fn register_calls(&self) -> Vec<RegisterCall> {
        self.inner.register_calls.lock().unwrap().clone()
    }

    /// The identities of every grant, in order.
    pub fn grant_calls(&self) -> Vec<Vec<Identity>> {
        self.inner.grant_calls.lock().unwrap().clone()
    }

    /// Number of revocations.
    pub fn revoke_calls(&self) -> usize {
        self.inner.revoke_calls.load(Ordering::SeqCst)
    }

    /// Number of access checks.
    pub fn can_access_calls(&self) -> usize {
        self.inner.can_access_calls.load(Ordering::SeqCst)
    }

    /// Number of pointer lookups.
    pub fn resolve_calls(&self) -> usize {
        self.inner.resolve_calls.load(Ordering::SeqCst)
    }

    /// Current grant set of `doc`.
    pub fn grantees(&self, doc: DocumentId) -> Vec<Identity> {
        self.inner.ledger.grantees(doc).unwrap()
    }

    fn read_failure(&self) -> Option<LedgerError> {
        self.inner.read_failure.lock().unwrap().clone()
    }
}

impl LedgerPort for RecordingLedger {
    async fn register_document(
        &self,
        id: DocumentId,
        pointer: &ContentPointer,
        policy: AccessPolicy,
    ) -> LedgerResult<LedgerReceipt> {
        self.inner.register_calls.lock().unwrap().push(RegisterCall {
            id,
            pointer: pointer.clone(),
            policy,
        });
        let failure = self.inner.register_failure.lock().unwrap().take();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner.ledger.register_document(id, pointer, policy).await
    }

    async fn grant(&self, identities: &[Identity], doc: DocumentId) -> LedgerResult<LedgerReceipt> {
        self.inner
            .grant_calls
            .lock()
            .unwrap()
            .push(identities.to_vec());
        self.inner.ledger.grant(identities, doc).await
    }

    async fn revoke(&self, identity: Identity, doc: DocumentId) -> LedgerResult<LedgerReceipt> {
        self.inner.revoke_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.ledger.revoke(identity, doc).await
    }

    async fn can_access(&self, identity: Identity, doc: DocumentId) -> LedgerResult<bool> {
        self.inner.can_access_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.read_failure() {
            return Err(error);
        }
        self.inner.ledger.can_access(identity, doc).await
    }

    async fn resolve_pointer(&self, doc: DocumentId) -> LedgerResult<ContentPointer> {
        self.inner.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.read_failure() {
            return Err(error);
        }
        self.inner.ledger.resolve_pointer(doc).await
    }
}

/// A wallet that is either connected to a fixed address or absent.
pub struct FixedIdentity(Option<Identity>);

impl FixedIdentity {
    /// A wallet connected as `identity`.
    pub const fn connected(identity: Identity) -> Self {
        Self(Some(identity))
    }

    /// No wallet available.
    pub const fn disconnected() -> Self {
        Self(None)
    }
}

impl IdentityPort for FixedIdentity {
    async fn connect(&self) -> Result<Identity, IdentityError> {
        self.0.ok_or(IdentityError::NoWalletProvider)
    }

    fn current(&self) -> Option<Identity> {
        self.0
    }
}

/// Workflow over the test doubles.
pub type TestWorkflow = VaultWorkflow<FakeStorage, RecordingLedger, FixedIdentity>;

/// Builds a workflow over clones of `storage` and `ledger`.
pub fn workflow(
    storage: &FakeStorage,
    ledger: &RecordingLedger,
    identity: FixedIdentity,
) -> TestWorkflow {
    init_tracing();
    VaultWorkflow::new(Session::new(storage.clone(), ledger.clone(), identity))
}

/// A small non-empty PDF.
pub fn sample_file() -> DocumentFile {
    DocumentFile::new("contract.pdf", b"%PDF-1.7 signed contract".to_vec())
        .with_content_type("application/pdf")
}
