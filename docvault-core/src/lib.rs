//! `docvault-core` lets a client vault documents: the file goes to content-addressed storage, and a ledger
//! keyed by a name-derived identifier records where it lives and which wallets may read it.
//!
//! Start with [`Session`] (the collaborators) and [`VaultWorkflow`] (the operations).

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod access_policy;
pub use access_policy::*;

mod document;
pub use document::*;

mod document_id;
pub use document_id::*;

mod error;
pub use error::*;

mod primitives;
pub use primitives::{parse_identity, parse_identity_list};

mod session;
pub use session::*;

mod config;
pub use config::*;

/// Default endpoints and confirmation depth.
pub mod defaults;

/// Bridge from the `log` facade to a host-provided logger.
pub mod logger;

pub mod identity;
pub mod ledger;
pub mod storage;
pub mod workflow;

pub use identity::{Identity, IdentityPort, LocalWallet};
pub use ledger::{InMemoryLedger, LedgerPort, LedgerReceipt};
pub use storage::{PinataStorage, StoragePort};
pub use workflow::{
    AccessDecision, GrantOutcome, OperationKind, Registration, RevokeOutcome, Stage,
    StatusEvent, VaultWorkflow,
};

// private modules
mod http_request;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("docvault_core");
