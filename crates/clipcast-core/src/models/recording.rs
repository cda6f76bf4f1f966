use bytes::Bytes;
use chrono::{DateTime, Local};

/// MIME type assumed for the webcam stream when the capture side does not say.
pub const DEFAULT_SECONDARY_MIME: &str = "video/webm";

/// Output of one capture session, handed to the pipeline exactly once.
///
/// The primary blob is the screen capture; the optional secondary blob is the
/// webcam stream recorded alongside it.
#[derive(Debug, Clone)]
pub struct CompletedRecording {
    pub primary_blob: Bytes,
    pub primary_mime: String,
    pub duration_seconds: f64,
    pub secondary_blob: Option<Bytes>,
    pub secondary_mime: Option<String>,
    /// Explicit title. When `None` an auto title is derived at start time.
    pub title: Option<String>,
}

impl CompletedRecording {
    pub fn new(primary_blob: impl Into<Bytes>, primary_mime: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            primary_blob: primary_blob.into(),
            primary_mime: primary_mime.into(),
            duration_seconds,
            secondary_blob: None,
            secondary_mime: None,
            title: None,
        }
    }

    pub fn with_webcam(mut self, blob: impl Into<Bytes>, mime: Option<String>) -> Self {
        self.secondary_blob = Some(blob.into());
        self.secondary_mime = mime;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn secondary_mime(&self) -> &str {
        self.secondary_mime
            .as_deref()
            .unwrap_or(DEFAULT_SECONDARY_MIME)
    }
}

/// A user-selected file waiting in the batch upload list.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub blob: Bytes,
    pub mime: String,
    pub title: String,
    pub size_bytes: u64,
}

impl PendingFile {
    pub fn new(blob: impl Into<Bytes>, mime: impl Into<String>, title: impl Into<String>) -> Self {
        let blob = blob.into();
        Self {
            size_bytes: blob.len() as u64,
            blob,
            mime: mime.into(),
            title: title.into(),
        }
    }
}

/// What a single orchestrator run uploads.
#[derive(Debug, Clone)]
pub enum UploadInput {
    Recording(CompletedRecording),
    File(PendingFile),
}

impl From<CompletedRecording> for UploadInput {
    fn from(recording: CompletedRecording) -> Self {
        UploadInput::Recording(recording)
    }
}

impl From<PendingFile> for UploadInput {
    fn from(file: PendingFile) -> Self {
        UploadInput::File(file)
    }
}

/// Title given to recordings the user did not name, e.g. "Recording Oct 18, 2026, 3:04 PM".
pub fn default_recording_title(now: DateTime<Local>) -> String {
    format!("Recording {}", now.format("%b %-d, %Y, %-I:%M %p"))
}
