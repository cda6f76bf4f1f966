//! Metadata API seam used by the pipeline.
//!
//! `clipcast-api-client` implements this over HTTP; tests implement it in memory.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CreateVideoRequest, Quota, UploadTicket};

/// Create, finalize, rename and delete video records, and read the quota snapshot.
///
/// The create calls return `Ok(None)` when the server answered without a
/// record (a `null` body). Callers treat that the same as an error.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// `POST /api/videos` for a freshly captured recording.
    async fn create_recording(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>>;

    /// `POST /api/videos/upload` for a user-selected file.
    async fn create_upload(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>>;

    /// `PATCH /api/videos/:id` with `{status: "ready"}`.
    async fn finalize_video(&self, video_id: &str) -> Result<()>;

    /// `PATCH /api/videos/:id` with `{title}`.
    async fn rename_video(&self, video_id: &str, title: &str) -> Result<()>;

    /// `DELETE /api/videos/:id`.
    async fn delete_video(&self, video_id: &str) -> Result<()>;

    /// `GET /api/videos/limits`.
    async fn get_limits(&self) -> Result<Quota>;
}
