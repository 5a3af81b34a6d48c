use crate::{
    config::VaultConfig,
    error::VaultError,
    identity::{Identity, IdentityPort, LocalWallet},
    ledger::{ChainLedger, LedgerPort},
    storage::{PinataStorage, StoragePort},
};

/// The collaborators a vault talks to: content storage, the authorization ledger and the wallet.
///
/// A `Session` is owned by the caller and handed to [`crate::VaultWorkflow`]; nothing about the connection
/// lives in global state. The only mutable part is the wallet connection, written once on connect.
pub struct Session<S, L, I> {
    pub(crate) storage: S,
    pub(crate) ledger: L,
    pub(crate) identity: I,
}

impl<S, L, I> Session<S, L, I>
where
    S: StoragePort,
    L: LedgerPort,
    I: IdentityPort,
{
    /// Assembles a session from its collaborators.
    #[must_use]
    pub const fn new(storage: S, ledger: L, identity: I) -> Self {
        Self {
            storage,
            ledger,
            identity,
        }
    }

    /// The connected wallet address, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.identity.current()
    }

    /// The storage collaborator.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The ledger collaborator.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }
}

impl Session<PinataStorage, ChainLedger, LocalWallet> {
    /// Builds the production session: Pinata storage, the on-chain ledger and a local wallet whose key
    /// signs ledger mutations.
    ///
    /// # Errors
    /// Returns `VaultError::Configuration` if the RPC endpoint cannot be used.
    pub fn from_config(config: &VaultConfig, wallet: LocalWallet) -> Result<Self, VaultError> {
        let storage = PinataStorage::new(&config.pinning);
        let ledger = ChainLedger::connect(
            &config.rpc_url,
            config.ledger_address,
            wallet.signer(),
            config.confirmations,
        )
        .map_err(|e| VaultError::Configuration {
            reason: e.to_string(),
        })?;

        log::info!(
            "vault session ready for ledger {} at {}",
            ledger.address(),
            config.rpc_url
        );
        Ok(Self::new(storage, ledger, wallet))
    }
}
