use std::str::FromStr;
use std::sync::OnceLock;

use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

use super::{Identity, IdentityError, IdentityPort};

/// A wallet backed by a locally held private key.
///
/// The address is only exposed through [`IdentityPort::current`] after [`IdentityPort::connect`]; the
/// connection is written once and read thereafter.
#[derive(Debug, Default)]
pub struct LocalWallet {
    signer: Option<PrivateKeySigner>,
    connected: OnceLock<Identity>,
}

impl LocalWallet {
    /// A wallet holding `signer`.
    #[must_use]
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            signer: Some(signer),
            connected: OnceLock::new(),
        }
    }

    /// A wallet slot with no key. Connecting fails with `IdentityError::NoWalletProvider`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a hex encoded private key (with or without `0x`).
    ///
    /// # Errors
    /// Returns `IdentityError::ConnectionRejected` if the key is malformed.
    pub fn from_private_key(key: &SecretString) -> Result<Self, IdentityError> {
        let signer = PrivateKeySigner::from_str(key.expose_secret().trim())
            .map_err(|e| IdentityError::ConnectionRejected(format!("invalid private key: {e}")))?;
        Ok(Self::new(signer))
    }

    /// The signer authorizing ledger mutations, if a key is held.
    #[must_use]
    pub fn signer(&self) -> Option<PrivateKeySigner> {
        self.signer.clone()
    }
}

impl IdentityPort for LocalWallet {
    async fn connect(&self) -> Result<Identity, IdentityError> {
        let signer = self.signer.as_ref().ok_or(IdentityError::NoWalletProvider)?;
        Ok(*self.connected.get_or_init(|| signer.address()))
    }

    fn current(&self) -> Option<Identity> {
        self.connected.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ANVIL_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_connect_exposes_address() {
        let wallet = LocalWallet::from_private_key(&SecretString::from(ANVIL_KEY)).unwrap();
        assert_eq!(wallet.current(), None);

        let identity = wallet.connect().await.unwrap();

        assert_eq!(
            identity,
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(wallet.current(), Some(identity));
        assert_eq!(wallet.connect().await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_connect_without_key() {
        let wallet = LocalWallet::empty();
        assert_eq!(
            wallet.connect().await,
            Err(IdentityError::NoWalletProvider)
        );
        assert_eq!(wallet.current(), None);
    }

    #[test]
    fn test_malformed_key_is_rejected() {
        let result = LocalWallet::from_private_key(&SecretString::from("0x1234"));
        assert!(matches!(result, Err(IdentityError::ConnectionRejected(_))));
    }
}
