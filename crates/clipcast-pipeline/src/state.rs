//! Pipeline state machine
//!
//! One tagged union replaces the "is uploading / is ready / error message"
//! flags a UI would otherwise juggle. Only the orchestrator writes it.

use clipcast_core::models::ShareDescriptor;
use clipcast_core::FailureReason;
use serde::Serialize;

use crate::progress::ProgressEvent;

/// Which stream a transfer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Screen capture or the selected file.
    Primary,
    /// Webcam capture recorded alongside the screen.
    Secondary,
}

/// Current phase of one upload run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing in flight; `start` is accepted.
    Idle,
    /// Waiting for the metadata API to create the record.
    Creating,
    UploadingPrimary {
        video_id: String,
        progress: Option<ProgressEvent>,
    },
    UploadingSecondary {
        video_id: String,
        progress: Option<ProgressEvent>,
    },
    /// Bytes are stored; flipping the record to ready.
    Finalizing { video_id: String },
    /// Terminal. The only state in which the video may be shared.
    Ready { share: ShareDescriptor },
    /// Terminal. `video_id` is set when a record had been created (and was compensated).
    /// `recoverable` tells the UI whether to offer "try again".
    Failed {
        reason: FailureReason,
        message: String,
        video_id: Option<String>,
        recoverable: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggested_action: Option<&'static str>,
    },
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Creating => "creating",
            PipelineState::UploadingPrimary { .. } => "uploading_primary",
            PipelineState::UploadingSecondary { .. } => "uploading_secondary",
            PipelineState::Finalizing { .. } => "finalizing",
            PipelineState::Ready { .. } => "ready",
            PipelineState::Failed { .. } => "failed",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PipelineState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Ready { .. } | PipelineState::Failed { .. })
    }

    /// Progress of the stream currently uploading, if any.
    pub fn progress(&self) -> Option<ProgressEvent> {
        match self {
            PipelineState::UploadingPrimary { progress, .. }
            | PipelineState::UploadingSecondary { progress, .. } => *progress,
            _ => None,
        }
    }

    /// Record progress for `stream`. Ignored unless that stream is the one uploading.
    pub(crate) fn set_progress(&mut self, stream: Stream, event: ProgressEvent) -> bool {
        match (self, stream) {
            (PipelineState::UploadingPrimary { progress, .. }, Stream::Primary)
            | (PipelineState::UploadingSecondary { progress, .. }, Stream::Secondary) => {
                *progress = Some(event);
                true
            }
            _ => false,
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle
    }
}
