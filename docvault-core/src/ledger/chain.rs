use alloy::{
    contract::Error as ContractError,
    network::{EthereumWallet, ReceiptResponse},
    primitives::Address,
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};

use self::bindings::IDocumentVault;
use super::{LedgerError, LedgerPort, LedgerReceipt, LedgerResult};
use crate::{
    access_policy::AccessPolicy, document::ContentPointer, document_id::DocumentId,
    identity::Identity,
};

#[allow(dead_code, missing_docs)]
mod bindings {
    use alloy::sol;

    sol!(
        /// The document vault authorization contract.
        ///
        /// Maps document ids to IPFS CIDs and keeps the set of wallets allowed to view each document.
        #[sol(rpc)]
        interface IDocumentVault {
            function createDocument(uint256 docId, string cid, bool isSingle) external;

            function grantAccess(address[] viewers, uint256 docId) external;

            function revokeAccess(address viewer, uint256 docId) external;

            function canAccess(address user, uint256 docId) external view returns (bool);

            function documentCids(uint256 docId) external view returns (string);
        }
    );
}

/// Ledger backed by the on-chain document vault contract.
///
/// Mutations are signed by the wallet the ledger was built with and resolve once the transaction is
/// included with the configured number of confirmations.
pub struct ChainLedger {
    contract: IDocumentVault::IDocumentVaultInstance<DynProvider>,
    confirmations: u64,
}

impl ChainLedger {
    /// Connects to the contract at `address` over HTTP JSON-RPC.
    ///
    /// Without a `signer` the ledger can still answer queries, but every mutation will be refused by the node.
    ///
    /// # Errors
    /// Returns `LedgerError::Unavailable` if `rpc_url` is not a valid URL.
    pub fn connect(
        rpc_url: &str,
        address: Address,
        signer: Option<PrivateKeySigner>,
        confirmations: u64,
    ) -> LedgerResult<Self> {
        let url: reqwest::Url = rpc_url.parse().map_err(|e| {
            LedgerError::Unavailable(format!("invalid rpc url {rpc_url}: {e}"))
        })?;

        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        Ok(Self {
            contract: IDocumentVault::new(address, provider),
            confirmations: confirmations.max(1),
        })
    }

    /// Address of the bound contract.
    #[must_use]
    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn finalize(
        &self,
        pending: Result<PendingTransactionBuilder<alloy::network::Ethereum>, ContractError>,
    ) -> LedgerResult<LedgerReceipt> {
        let pending = pending.map_err(classify_contract_error)?;
        let tx_hash = *pending.tx_hash();
        log::debug!("submitted {tx_hash}, awaiting {} confirmation(s)", self.confirmations);

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| LedgerError::Unavailable(format!("awaiting {tx_hash}: {e}")))?;

        if !receipt.status() {
            return Err(LedgerError::Rejected(format!(
                "transaction {tx_hash} reverted"
            )));
        }

        Ok(LedgerReceipt {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
        })
    }
}

impl LedgerPort for ChainLedger {
    async fn register_document(
        &self,
        id: DocumentId,
        pointer: &ContentPointer,
        policy: AccessPolicy,
    ) -> LedgerResult<LedgerReceipt> {
        let existing = self
            .contract
            .documentCids(id.0)
            .call()
            .await
            .map_err(classify_contract_error)?;
        if !existing.is_empty() {
            return Err(LedgerError::AlreadyRegistered(id));
        }

        let pending = self
            .contract
            .createDocument(id.0, pointer.as_str().to_string(), policy.is_single_grantee())
            .send()
            .await;

        self.finalize(pending).await.map_err(|err| match err {
            LedgerError::Rejected(reason) if mentions_existing_document(&reason) => {
                LedgerError::AlreadyRegistered(id)
            }
            other => other,
        })
    }

    async fn grant(
        &self,
        identities: &[Identity],
        doc: DocumentId,
    ) -> LedgerResult<LedgerReceipt> {
        let pending = self
            .contract
            .grantAccess(identities.to_vec(), doc.0)
            .send()
            .await;
        self.finalize(pending).await
    }

    async fn revoke(
        &self,
        identity: Identity,
        doc: DocumentId,
    ) -> LedgerResult<LedgerReceipt> {
        let pending = self.contract.revokeAccess(identity, doc.0).send().await;
        self.finalize(pending).await
    }

    async fn can_access(&self, identity: Identity, doc: DocumentId) -> LedgerResult<bool> {
        self.contract
            .canAccess(identity, doc.0)
            .call()
            .await
            .map_err(classify_contract_error)
    }

    async fn resolve_pointer(&self, doc: DocumentId) -> LedgerResult<ContentPointer> {
        let cid = self
            .contract
            .documentCids(doc.0)
            .call()
            .await
            .map_err(classify_contract_error)?;

        let pointer = ContentPointer::new(cid);
        if pointer.is_empty() {
            return Err(LedgerError::DocumentNotFound(doc));
        }
        Ok(pointer)
    }
}

/// A JSON-RPC error response means the node evaluated the call and refused it (typically a revert);
/// anything else on the transport means the ledger could not be reached.
fn classify_contract_error(error: ContractError) -> LedgerError {
    match &error {
        ContractError::TransportError(rpc) => match rpc.as_error_resp() {
            Some(payload) => LedgerError::Rejected(payload.message.to_string()),
            None => LedgerError::Unavailable(rpc.to_string()),
        },
        ContractError::PendingTransactionError(e) => LedgerError::Unavailable(e.to_string()),
        _ => LedgerError::Rejected(error.to_string()),
    }
}

fn mentions_existing_document(reason: &str) -> bool {
    let reason = reason.to_lowercase();
    reason.contains("already exists") || reason.contains("already registered")
}
