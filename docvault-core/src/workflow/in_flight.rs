//! Guards against running an operation kind twice at the same time.
//!
//! The ledger does not promise to serialize overlapping grant/revoke calls from one caller, so a second
//! invocation of a kind that is already running is refused instead of being sent.

use std::sync::atomic::{AtomicBool, Ordering};

use super::OperationKind;
use crate::error::VaultError;

/// One busy flag per operation kind.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    create_and_register: AtomicBool,
    grant_access: AtomicBool,
    revoke_access: AtomicBool,
    check_and_reveal: AtomicBool,
}

/// Holds the busy flag of one operation kind for its lifetime.
#[derive(Debug)]
pub(crate) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl InFlight {
    const fn flag(&self, kind: OperationKind) -> &AtomicBool {
        match kind {
            OperationKind::CreateAndRegister => &self.create_and_register,
            OperationKind::GrantAccess => &self.grant_access,
            OperationKind::RevokeAccess => &self.revoke_access,
            OperationKind::CheckAndReveal => &self.check_and_reveal,
        }
    }

    /// Marks `kind` busy.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::OperationInProgress` if `kind` is already busy.
    pub(crate) fn try_begin(
        &self,
        kind: OperationKind,
    ) -> Result<InFlightGuard<'_>, VaultError> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| VaultError::OperationInProgress { operation: kind })?;
        Ok(InFlightGuard { flag })
    }

    pub(crate) fn is_busy(&self, kind: OperationKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
