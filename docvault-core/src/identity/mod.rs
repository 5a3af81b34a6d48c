//! Wallet identity of the person operating the vault.

use std::future::Future;

use alloy_primitives::Address;
use thiserror::Error;

mod local;
pub use local::LocalWallet;

/// A wallet address. Viewers are granted access by address, and the connected address is the implicit
/// viewer when checking access.
pub type Identity = Address;

/// Errors raised while connecting a wallet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No wallet provider is available.
    #[error("no wallet provider found")]
    NoWalletProvider,

    /// The user or the provider declined the connection.
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(String),
}

/// Wallet interface used by the vault workflow.
pub trait IdentityPort: Send + Sync {
    /// Connects to the wallet and returns its address. Reconnecting returns the same address.
    ///
    /// # Errors
    ///
    /// `IdentityError::NoWalletProvider` if there is no wallet, `IdentityError::ConnectionRejected` if the
    /// connection is declined.
    fn connect(&self) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// The connected address, or `None` until [`IdentityPort::connect`] has succeeded.
    fn current(&self) -> Option<Identity>;
}
