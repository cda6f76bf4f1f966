//! Quota preflight for batch uploads.
//!
//! The batch path checks the monthly limit before creating anything so a
//! known-exhausted quota never burns half a batch. The single-recording path
//! does not use this gate; it relies on the server rejecting the create call.

use std::sync::Arc;

use clipcast_core::models::Quota;
use clipcast_core::{PipelineError, VideoApi};

/// Why a batch may not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDenial {
    QuotaReached,
    InsufficientQuota { remaining: i64 },
}

impl QuotaDenial {
    pub fn into_error(self, requested: usize) -> PipelineError {
        match self {
            QuotaDenial::QuotaReached => PipelineError::QuotaReached,
            QuotaDenial::InsufficientQuota { remaining } => {
                PipelineError::InsufficientQuota {
                    remaining,
                    requested,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied(QuotaDenial),
}

impl QuotaDecision {
    /// Pure decision for a snapshot. A zero max is unlimited.
    pub fn evaluate(quota: &Quota, file_count: usize) -> Self {
        let Some(remaining) = quota.remaining() else {
            return QuotaDecision::Allowed;
        };

        if remaining <= 0 {
            QuotaDecision::Denied(QuotaDenial::QuotaReached)
        } else if file_count as i64 > remaining {
            QuotaDecision::Denied(QuotaDenial::InsufficientQuota { remaining })
        } else {
            QuotaDecision::Allowed
        }
    }
}

pub struct QuotaGate {
    api: Arc<dyn VideoApi>,
}

impl QuotaGate {
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self { api }
    }

    /// Fetch a fresh snapshot and decide. Fails open: if the snapshot cannot be
    /// read the batch is allowed and the server stays the final authority.
    pub async fn check(&self, file_count: usize) -> QuotaDecision {
        let quota = match self.api.get_limits().await {
            Ok(quota) => quota,
            Err(e) => {
                tracing::warn!(
                    error = %format!("{:#}", e),
                    file_count,
                    "Quota check failed, allowing upload"
                );
                return QuotaDecision::Allowed;
            }
        };

        let decision = QuotaDecision::evaluate(&quota, file_count);
        tracing::debug!(
            max = quota.max_videos_per_month,
            used = quota.videos_used_this_month,
            file_count,
            decision = ?decision,
            "Quota checked"
        );
        decision
    }
}
