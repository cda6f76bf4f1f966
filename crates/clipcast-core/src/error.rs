//! Error types module
//!
//! Every way an upload run can end badly is a `PipelineError` variant. Each
//! variant maps to a stable machine-readable code that the UI shows as the
//! `Failed` state's reason, plus presentation metadata through [`ErrorMetadata`].
//!
//! Lower layers (the HTTP client, the storage transport) report with
//! `anyhow::Error`; the orchestrator converts those into a variant at the stage
//! boundary where the failure happened.

use serde::Serialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected outcomes like a rejected start
    Debug,
    /// Warning level - for user-actionable failures like quota exhaustion
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation - defines how an error is shown to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "upload_failed")
    fn error_code(&self) -> &'static str;

    /// Whether a user-initiated "try again" can reasonably succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Reason attached to a `Failed` pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    QuotaReached,
    InsufficientQuota,
    CreateFailed,
    UploadFailed,
    WebcamUploadFailed,
    FinalizeFailed,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::QuotaReached => "quota_reached",
            FailureReason::InsufficientQuota => "insufficient_quota",
            FailureReason::CreateFailed => "create_failed",
            FailureReason::UploadFailed => "upload_failed",
            FailureReason::WebcamUploadFailed => "webcam_upload_failed",
            FailureReason::FinalizeFailed => "finalize_failed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Monthly video limit reached")]
    QuotaReached,

    #[error("Insufficient quota: {remaining} uploads remaining, {requested} requested")]
    InsufficientQuota { remaining: i64, requested: usize },

    #[error("Failed to create video record: {0}")]
    CreateFailed(String),

    #[error("Upload failed: {0}")]
    TransportFailed(String),

    #[error("Webcam upload failed: {0}")]
    WebcamTransportFailed(String),

    #[error("Failed to finalize video: {0}")]
    FinalizeFailed(String),

    #[error("Pipeline is busy: cannot start while {0}")]
    Busy(&'static str),
}

impl PipelineError {
    /// Reason for the `Failed` state. `Busy` never produces a `Failed` state.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            PipelineError::QuotaReached => Some(FailureReason::QuotaReached),
            PipelineError::InsufficientQuota { .. } => Some(FailureReason::InsufficientQuota),
            PipelineError::CreateFailed(_) => Some(FailureReason::CreateFailed),
            PipelineError::TransportFailed(_) => Some(FailureReason::UploadFailed),
            PipelineError::WebcamTransportFailed(_) => Some(FailureReason::WebcamUploadFailed),
            PipelineError::FinalizeFailed(_) => Some(FailureReason::FinalizeFailed),
            PipelineError::Busy(_) => None,
        }
    }

    /// Render an error and its source chain on one line, like `{:#}` on anyhow.
    pub fn from_chain(err: &anyhow::Error) -> String {
        format!("{:#}", err)
    }
}

/// Static metadata for each variant: (code, recoverable, suggested_action, log_level).
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        PipelineError::QuotaReached => (
            "quota_reached",
            false,
            Some("Upgrade your plan or wait for the monthly limit to reset"),
            LogLevel::Warn,
        ),
        PipelineError::InsufficientQuota { .. } => (
            "insufficient_quota",
            false,
            Some("Remove some files from the batch or upgrade your plan"),
            LogLevel::Warn,
        ),
        PipelineError::CreateFailed(_) => (
            "create_failed",
            true,
            Some("Try again"),
            LogLevel::Error,
        ),
        PipelineError::TransportFailed(_) => (
            "upload_failed",
            true,
            Some("Check your connection and try again"),
            LogLevel::Error,
        ),
        PipelineError::WebcamTransportFailed(_) => (
            "webcam_upload_failed",
            true,
            Some("Check your connection and try again"),
            LogLevel::Error,
        ),
        PipelineError::FinalizeFailed(_) => (
            "finalize_failed",
            true,
            Some("Try again"),
            LogLevel::Error,
        ),
        PipelineError::Busy(_) => (
            "pipeline_busy",
            false,
            Some("Wait for the current upload to finish"),
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::QuotaReached => {
                "You have reached your monthly video limit".to_string()
            }
            PipelineError::InsufficientQuota { remaining, .. } => format!(
                "You can only upload {} more video{} this month",
                remaining,
                if *remaining == 1 { "" } else { "s" }
            ),
            PipelineError::CreateFailed(_) => "Could not create the video".to_string(),
            PipelineError::TransportFailed(_) => "Upload failed".to_string(),
            PipelineError::WebcamTransportFailed(_) => "Webcam upload failed".to_string(),
            PipelineError::FinalizeFailed(_) => "Could not finish processing the video".to_string(),
            PipelineError::Busy(_) => "An upload is already in progress".to_string(),
        }
    }
}
