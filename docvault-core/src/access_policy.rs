use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// An `AccessPolicy` fixes how many viewers a document admits at once.
///
/// The policy is chosen when the document is registered and cannot change afterwards. The ledger is the
/// only party enforcing it; the workflow merely requests registration with it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessPolicy {
    /// Exactly one grantee at a time.
    Single,
    /// An open set of grantees.
    Multi,
}

impl AccessPolicy {
    /// The `singleGrantee` flag expected by the ledger's registration call.
    #[must_use]
    pub const fn is_single_grantee(self) -> bool {
        matches!(self, Self::Single)
    }
}
