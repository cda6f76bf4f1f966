use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Lifecycle of a server-side video record. The pipeline only ever writes `Ready`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Creating,
    Uploading,
    Ready,
    Failed,
}

impl Display for VideoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoStatus::Creating => write!(f, "creating"),
            VideoStatus::Uploading => write!(f, "uploading"),
            VideoStatus::Ready => write!(f, "ready"),
            VideoStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Body of `POST /api/videos` and `POST /api/videos/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub title: String,
    pub file_size: u64,
    pub content_type: String,
    /// Declares a secondary (webcam) stream; only sent on the recording path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webcam_file_size: Option<u64>,
}

/// Response of the create endpoints: where to PUT the bytes and how to share them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    #[serde(rename = "id")]
    pub video_id: String,
    pub upload_url: String,
    #[serde(default)]
    pub share_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webcam_upload_url: Option<String>,
}

impl UploadTicket {
    /// A ticket without an id or upload URL is as good as no ticket.
    pub fn is_usable(&self) -> bool {
        !self.video_id.trim().is_empty() && !self.upload_url.trim().is_empty()
    }
}

/// Body of `PATCH /api/videos/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UpdateVideoRequest {
    Status { status: VideoStatus },
    Title { title: String },
}

/// Everything the UI needs to share a finished video.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareDescriptor {
    pub video_id: String,
    pub share_token: String,
    pub share_url: String,
}

impl ShareDescriptor {
    pub fn new(origin: &str, video_id: impl Into<String>, share_token: impl Into<String>) -> Self {
        let share_token = share_token.into();
        Self {
            video_id: video_id.into(),
            share_url: share_url(origin, &share_token),
            share_token,
        }
    }
}

/// `<origin>/watch/<shareToken>`. No server round trip.
pub fn share_url(origin: &str, share_token: &str) -> String {
    format!("{}/watch/{}", origin.trim_end_matches('/'), share_token)
}
