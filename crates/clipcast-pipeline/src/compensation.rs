//! Compensating cleanup for partially completed runs.

use std::sync::Arc;

use clipcast_core::VideoApi;

/// Deletes metadata records left behind by a run that failed after create.
pub struct CompensationManager {
    api: Arc<dyn VideoApi>,
}

impl CompensationManager {
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self { api }
    }

    /// Best-effort DELETE of `video_id`. May fail silently: the error is logged
    /// and dropped so it never replaces the failure the user needs to see.
    pub async fn compensate(&self, video_id: &str) {
        match self.api.delete_video(video_id).await {
            Ok(()) => {
                tracing::info!(video_id = %video_id, "Deleted orphaned video record");
            }
            Err(e) => {
                tracing::warn!(
                    video_id = %video_id,
                    error = %format!("{:#}", e),
                    "Failed to delete orphaned video record"
                );
            }
        }
    }
}
