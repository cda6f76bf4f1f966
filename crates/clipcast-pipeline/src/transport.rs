//! Direct-to-storage transfers against presigned URLs.
//!
//! A transfer reports through a [`TransferSender`]: progress as body chunks
//! are handed to the HTTP stack, then exactly one terminal event. Nothing is
//! retried here; a failed transfer fails the run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use clipcast_core::ClientConfig;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};

use crate::progress::{ProgressEvent, TransferEvent, TransferSender};

/// Binary upload of one blob to one URL.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// PUT `data` to `url` with `Content-Type: content_type`.
    ///
    /// Implementations send at least one `Progress` event and exactly one
    /// terminal event on `events` before returning.
    async fn upload(&self, url: &str, data: Bytes, content_type: &str, events: TransferSender);
}

/// [`UploadTransport`] over reqwest. Presigned URLs carry their own
/// credentials, so no auth header is added, and no request timeout is set.
#[derive(Clone, Debug)]
pub struct PresignedTransport {
    client: Client,
    chunk_size: usize,
}

impl PresignedTransport {
    pub fn new(chunk_size: usize) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create storage HTTP client")?;

        Ok(Self {
            client,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.upload_chunk_bytes)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Split without copying; `Bytes::slice` shares the buffer.
fn split_chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(data.len() / chunk_size + 1);
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + chunk_size).min(data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }
    chunks
}

#[async_trait]
impl UploadTransport for PresignedTransport {
    async fn upload(&self, url: &str, data: Bytes, content_type: &str, events: TransferSender) {
        let total = data.len() as u64;
        // Send errors only mean nobody is listening anymore.
        let _ = events.send(TransferEvent::Progress(ProgressEvent::new(0, total)));

        let progress = events.clone();
        let mut loaded = 0u64;
        let body = futures::stream::iter(split_chunks(&data, self.chunk_size)).map(move |chunk| {
            loaded += chunk.len() as u64;
            let _ = progress.send(TransferEvent::Progress(ProgressEvent::new(loaded, total)));
            Ok::<Bytes, std::io::Error>(chunk)
        });

        tracing::debug!(bytes = total, content_type = %content_type, "Starting storage upload");

        let result = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(Body::wrap_stream(body))
            .send()
            .await;

        let terminal = match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(bytes = total, status = %response.status(), "Storage upload completed");
                TransferEvent::Completed
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!(status = %status, "Storage rejected upload");
                TransferEvent::Failed {
                    status: Some(status.as_u16()),
                    message: format!("storage responded with status {}", status),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Storage upload request failed");
                TransferEvent::Failed {
                    status: e.status().map(|s| s.as_u16()),
                    message: format!("storage request failed: {}", e),
                }
            }
        };

        let _ = events.send(terminal);
    }
}
