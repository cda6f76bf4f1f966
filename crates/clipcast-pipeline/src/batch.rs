//! Sequential multi-file upload.
//!
//! Files go through the orchestrator strictly one at a time so a single
//! progress indicator can follow the active file. A failed file is recorded
//! and the batch moves on.

use clipcast_core::models::PendingFile;
use clipcast_core::{ErrorMetadata, FailureReason, PipelineError};
use serde::Serialize;
use tokio::sync::watch;

use crate::orchestrator::UploadOrchestrator;
use crate::quota_gate::{QuotaDecision, QuotaGate};
use crate::state::PipelineState;

/// Result for one file of a batch. Exactly one of `share_url` / `error` is set;
/// `error` is the same user-facing message the `Failed` state carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.share_url.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub results: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// "N of M succeeded"
    pub fn summary(&self) -> String {
        format!("{} of {} succeeded", self.succeeded(), self.total())
    }
}

/// The file currently owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFile {
    pub index: usize,
    pub total: usize,
    pub title: String,
}

pub struct BatchUploader {
    orchestrator: UploadOrchestrator,
    gate: QuotaGate,
    active: watch::Sender<Option<ActiveFile>>,
}

impl BatchUploader {
    pub fn new(orchestrator: UploadOrchestrator) -> Self {
        let gate = QuotaGate::new(orchestrator.api());
        let (active, _) = watch::channel(None);
        Self {
            orchestrator,
            gate,
            active,
        }
    }

    /// State of the file being uploaded.
    pub fn subscribe_state(&self) -> watch::Receiver<PipelineState> {
        self.orchestrator.subscribe()
    }

    /// Which file of the batch is active; `None` between batches.
    pub fn subscribe_active(&self) -> watch::Receiver<Option<ActiveFile>> {
        self.active.subscribe()
    }

    pub fn orchestrator(&self) -> &UploadOrchestrator {
        &self.orchestrator
    }

    /// Upload every file in order. Only a quota denial rejects the batch as a
    /// whole (before anything is created); per-file failures land in the summary.
    pub async fn run(&mut self, files: Vec<PendingFile>) -> Result<BatchSummary, PipelineError> {
        if files.is_empty() {
            return Ok(BatchSummary::default());
        }

        let total = files.len();
        if let QuotaDecision::Denied(denial) = self.gate.check(total).await {
            let err = denial.into_error(total);
            self.orchestrator.reset();
            self.orchestrator.reject(&err);
            return Err(err);
        }

        let mut summary = BatchSummary {
            results: Vec::with_capacity(total),
        };

        for (index, file) in files.into_iter().enumerate() {
            let title = file.title.clone();
            self.active.send_replace(Some(ActiveFile {
                index,
                total,
                title: title.clone(),
            }));

            self.orchestrator.reset();
            let outcome = match self.orchestrator.start(file).await {
                Ok(share) => FileOutcome {
                    title,
                    video_id: Some(share.video_id),
                    share_url: Some(share.share_url),
                    reason: None,
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(index, title = %title, error = %err, "Batch file failed");
                    FileOutcome {
                        title,
                        video_id: None,
                        share_url: None,
                        reason: err.reason(),
                        error: Some(err.client_message()),
                    }
                }
            };
            summary.results.push(outcome);
        }

        self.active.send_replace(None);
        tracing::info!(
            succeeded = summary.succeeded(),
            total = summary.total(),
            "Batch upload finished"
        );
        Ok(summary)
    }
}
