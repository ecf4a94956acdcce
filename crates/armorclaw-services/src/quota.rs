//! Quota Ledger
//!
//! The quota counter is derived: the number of submissions the identity owns. The check is
//! read-only and not atomic with the later write, so two concurrent uploads from one identity
//! can both pass and exceed the ceiling by a small margin. It is a soft usage cap.

use std::sync::Arc;

use armorclaw_core::{
    models::{Identity, IdentityClass},
    AppError, IntakePolicy,
};
use armorclaw_db::SubmissionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub class: IdentityClass,
    pub used: i64,
    pub limit: i64,
}

impl QuotaStatus {
    pub fn may_submit(&self) -> bool {
        self.used < self.limit
    }
}

#[derive(Clone)]
pub struct QuotaLedger {
    store: Arc<dyn SubmissionStore>,
    policy: IntakePolicy,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn SubmissionStore>, policy: IntakePolicy) -> Self {
        Self { store, policy }
    }

    /// Current usage for the identity. Fails closed: if the store cannot be read the caller
    /// gets `ServiceUnavailable` and no upload is accepted.
    pub async fn status(&self, identity: &Identity) -> Result<QuotaStatus, AppError> {
        let class = identity.class();
        let owner = identity.owner_key();

        let used = self.store.count_by_owner(&owner).await.map_err(|e| {
            tracing::error!(
                error = %e,
                owner = %owner,
                "Quota ledger unavailable, refusing upload"
            );
            AppError::ServiceUnavailable("Upload quota could not be verified".to_string())
        })?;

        Ok(QuotaStatus {
            class,
            used,
            limit: self.policy.ceiling(class).max_files,
        })
    }

    /// Like [`status`](Self::status) but turns a full quota into `QuotaExceeded`.
    pub async fn ensure_can_submit(&self, identity: &Identity) -> Result<QuotaStatus, AppError> {
        let status = self.status(identity).await?;
        if !status.may_submit() {
            tracing::info!(
                class = %status.class,
                used = status.used,
                limit = status.limit,
                "Upload rejected: quota reached"
            );
            return Err(AppError::QuotaExceeded {
                class: status.class,
                used: status.used,
                limit: status.limit,
            });
        }
        Ok(status)
    }
}
