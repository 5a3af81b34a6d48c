use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use alloy_primitives::keccak256;

use super::{LedgerError, LedgerPort, LedgerReceipt, LedgerResult};
use crate::{
    access_policy::AccessPolicy, document::ContentPointer, document_id::DocumentId,
    identity::Identity,
};

#[derive(Debug)]
struct Registration {
    pointer: ContentPointer,
    policy: AccessPolicy,
    grantees: BTreeSet<Identity>,
}

#[derive(Debug, Default)]
struct LedgerState {
    documents: HashMap<DocumentId, Registration>,
    height: u64,
}

impl LedgerState {
    /// Every accepted mutation is "mined" into its own block.
    fn seal(&mut self, payload: &[u8]) -> LedgerReceipt {
        self.height += 1;
        let mut preimage = self.height.to_be_bytes().to_vec();
        preimage.extend_from_slice(payload);
        LedgerReceipt {
            transaction_hash: keccak256(&preimage),
            block_number: Some(self.height),
        }
    }
}

/// Process-local ledger with the same observable semantics as the on-chain contract.
///
/// Useful for offline demos and tests. A `Single` document holds at most one grantee: granting a second,
/// different identity is rejected until the current one is revoked.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current grant set of `doc`, in address order. Empty for unknown documents.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Unavailable` if the ledger state is poisoned.
    pub fn grantees(&self, doc: DocumentId) -> LedgerResult<Vec<Identity>> {
        let state = self.lock()?;
        Ok(state
            .documents
            .get(&doc)
            .map(|r| r.grantees.iter().copied().collect())
            .unwrap_or_default())
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("mutex poisoned".to_string()))
    }

    fn hash_payload(doc: DocumentId, tag: &[u8]) -> Vec<u8> {
        let mut payload = tag.to_vec();
        payload.extend_from_slice(&doc.0.to_be_bytes::<32>());
        payload
    }
}

impl LedgerPort for InMemoryLedger {
    async fn register_document(
        &self,
        id: DocumentId,
        pointer: &ContentPointer,
        policy: AccessPolicy,
    ) -> LedgerResult<LedgerReceipt> {
        if pointer.is_empty() {
            return Err(LedgerError::Rejected("empty content pointer".to_string()));
        }

        let mut state = self.lock()?;
        if state.documents.contains_key(&id) {
            return Err(LedgerError::AlreadyRegistered(id));
        }
        state.documents.insert(
            id,
            Registration {
                pointer: pointer.clone(),
                policy,
                grantees: BTreeSet::new(),
            },
        );
        Ok(state.seal(&Self::hash_payload(id, b"createDocument")))
    }

    async fn grant(
        &self,
        identities: &[Identity],
        doc: DocumentId,
    ) -> LedgerResult<LedgerReceipt> {
        let mut state = self.lock()?;
        let registration = state
            .documents
            .get_mut(&doc)
            .ok_or_else(|| LedgerError::Rejected("document not registered".to_string()))?;

        let mut grantees = registration.grantees.clone();
        grantees.extend(identities.iter().copied());
        if registration.policy == AccessPolicy::Single && grantees.len() > 1 {
            return Err(LedgerError::Rejected(
                "single-access document already has a grantee".to_string(),
            ));
        }
        registration.grantees = grantees;

        Ok(state.seal(&Self::hash_payload(doc, b"grantAccess")))
    }

    async fn revoke(
        &self,
        identity: Identity,
        doc: DocumentId,
    ) -> LedgerResult<LedgerReceipt> {
        let mut state = self.lock()?;
        let registration = state
            .documents
            .get_mut(&doc)
            .ok_or_else(|| LedgerError::Rejected("document not registered".to_string()))?;
        registration.grantees.remove(&identity);

        Ok(state.seal(&Self::hash_payload(doc, b"revokeAccess")))
    }

    async fn can_access(&self, identity: Identity, doc: DocumentId) -> LedgerResult<bool> {
        let state = self.lock()?;
        Ok(state
            .documents
            .get(&doc)
            .is_some_and(|r| r.grantees.contains(&identity)))
    }

    async fn resolve_pointer(&self, doc: DocumentId) -> LedgerResult<ContentPointer> {
        let state = self.lock()?;
        state
            .documents
            .get(&doc)
            .map(|r| r.pointer.clone())
            .ok_or(LedgerError::DocumentNotFound(doc))
    }
}
