use std::path::Path;

use anyhow::Context;
use clipcast_core::models::{CompletedRecording, PendingFile};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type for a local video file, from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Title for an uploaded file: its name without the extension.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub async fn read_pending_file(path: &Path) -> anyhow::Result<PendingFile> {
    let blob = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(PendingFile::new(
        blob,
        content_type_for(path),
        title_from_path(path),
    ))
}

/// Assemble a finished recording from the screen capture and optional webcam file.
pub async fn read_recording(
    screen: &Path,
    webcam: Option<&Path>,
    duration_seconds: f64,
    title: Option<String>,
) -> anyhow::Result<CompletedRecording> {
    let blob = tokio::fs::read(screen)
        .await
        .with_context(|| format!("Failed to read screen recording {}", screen.display()))?;
    let mut recording = CompletedRecording::new(blob, content_type_for(screen), duration_seconds);

    if let Some(webcam) = webcam {
        let blob = tokio::fs::read(webcam)
            .await
            .with_context(|| format!("Failed to read webcam recording {}", webcam.display()))?;
        let mime = content_type_for(webcam);
        let mime = (mime != FALLBACK_CONTENT_TYPE).then(|| mime.to_string());
        recording = recording.with_webcam(blob, mime);
    }

    if let Some(title) = title {
        recording = recording.with_title(title);
    }
    Ok(recording)
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
