//! Upload orchestrator: create → upload primary → upload secondary → finalize.
//!
//! One orchestrator drives one run at a time. State is published on a watch
//! channel so a UI can render it; the orchestrator is the only writer. Any
//! failure after the record was created is compensated exactly once before
//! the run enters `Failed`.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use chrono::Local;
use clipcast_api_client::ApiClient;
use clipcast_core::models::{
    default_recording_title, CreateVideoRequest, ShareDescriptor, UploadInput, UploadTicket,
};
use clipcast_core::{ClientConfig, ErrorMetadata, LogLevel, PipelineError, VideoApi};
use tokio::sync::{mpsc, watch};

use crate::compensation::CompensationManager;
use crate::progress::{TransferEvent, TransferReceiver, TransferSender};
use crate::state::{PipelineState, Stream};
use crate::transport::{PresignedTransport, UploadTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateEndpoint {
    Recording,
    File,
}

/// Everything derived from the input before any network call.
struct UploadPlan {
    endpoint: CreateEndpoint,
    request: CreateVideoRequest,
    primary: Bytes,
    secondary: Option<(Bytes, String)>,
}

impl UploadPlan {
    fn from_input(input: UploadInput) -> Self {
        match input {
            UploadInput::Recording(recording) => {
                let title = recording
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| default_recording_title(Local::now()));
                let secondary_mime = recording.secondary_mime().to_string();
                let secondary = recording.secondary_blob.map(|blob| (blob, secondary_mime));

                Self {
                    endpoint: CreateEndpoint::Recording,
                    request: CreateVideoRequest {
                        title,
                        file_size: recording.primary_blob.len() as u64,
                        content_type: recording.primary_mime,
                        webcam_file_size: secondary.as_ref().map(|(blob, _)| blob.len() as u64),
                    },
                    primary: recording.primary_blob,
                    secondary,
                }
            }
            UploadInput::File(file) => {
                let title = if file.title.trim().is_empty() {
                    default_recording_title(Local::now())
                } else {
                    file.title
                };

                Self {
                    endpoint: CreateEndpoint::File,
                    request: CreateVideoRequest {
                        title,
                        file_size: file.size_bytes,
                        content_type: file.mime,
                        webcam_file_size: None,
                    },
                    primary: file.blob,
                    secondary: None,
                }
            }
        }
    }
}

/// Drives one upload run at a time and publishes its [`PipelineState`].
pub struct UploadOrchestrator {
    api: Arc<dyn VideoApi>,
    transport: Arc<dyn UploadTransport>,
    compensation: CompensationManager,
    share_origin: String,
    state: watch::Sender<PipelineState>,
}

impl UploadOrchestrator {
    pub fn new(
        api: Arc<dyn VideoApi>,
        transport: Arc<dyn UploadTransport>,
        share_origin: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            compensation: CompensationManager::new(api.clone()),
            api,
            transport,
            share_origin: share_origin.into(),
            state,
        }
    }

    /// Wire the HTTP metadata client and presigned transport from config.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::from_config(config)?);
        let transport = Arc::new(PresignedTransport::from_config(config)?);
        Ok(Self::new(api, transport, config.share_origin.clone()))
    }

    pub fn api(&self) -> Arc<dyn VideoApi> {
        self.api.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every transition and progress update.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Discard everything from the previous run and return to `Idle`.
    /// Never retries; the next `start` issues a brand-new create.
    pub fn reset(&mut self) {
        let previous = self.state.send_replace(PipelineState::Idle);
        tracing::debug!(from = previous.name(), "Pipeline reset");
    }

    /// Run the whole pipeline for one input. Rejected with `Busy` unless `Idle`.
    pub async fn start(
        &mut self,
        input: impl Into<UploadInput>,
    ) -> Result<ShareDescriptor, PipelineError> {
        let current = self.state.borrow().name();
        if current != PipelineState::Idle.name() {
            return Err(PipelineError::Busy(current));
        }

        let mut created: Option<String> = None;
        match self.run(input.into(), &mut created).await {
            Ok(share) => {
                tracing::info!(
                    video_id = %share.video_id,
                    share_url = %share.share_url,
                    "Video ready"
                );
                self.transition(PipelineState::Ready {
                    share: share.clone(),
                });
                Ok(share)
            }
            Err(err) => {
                // `take` leaves nothing behind, so the record is compensated at most once.
                let video_id = created.take();
                if let Some(id) = video_id.as_deref() {
                    self.compensation.compensate(id).await;
                }
                self.fail(&err, video_id);
                Err(err)
            }
        }
    }

    /// Put a run that never started into `Failed`, e.g. after a quota denial.
    pub(crate) fn reject(&mut self, err: &PipelineError) {
        if self.state.borrow().is_idle() {
            self.fail(err, None);
        }
    }

    fn fail(&self, err: &PipelineError, video_id: Option<String>) {
        let Some(reason) = err.reason() else {
            return;
        };
        match err.log_level() {
            LogLevel::Debug => {
                tracing::debug!(reason = %reason, video_id = ?video_id, error = %err, "Upload failed");
            }
            LogLevel::Warn => {
                tracing::warn!(reason = %reason, video_id = ?video_id, error = %err, "Upload failed");
            }
            LogLevel::Error => {
                tracing::error!(reason = %reason, video_id = ?video_id, error = %err, "Upload failed");
            }
        }
        self.transition(PipelineState::Failed {
            reason,
            message: err.client_message(),
            video_id,
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
        });
    }

    fn transition(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(
            from = previous.name(),
            to = self.state.borrow().name(),
            "Pipeline transition"
        );
    }

    async fn run(
        &self,
        input: UploadInput,
        created: &mut Option<String>,
    ) -> Result<ShareDescriptor, PipelineError> {
        let plan = UploadPlan::from_input(input);

        self.transition(PipelineState::Creating);
        let ticket = self.create(&plan).await?;
        *created = Some(ticket.video_id.clone());
        let video_id = ticket.video_id.as_str();

        self.transition(PipelineState::UploadingPrimary {
            video_id: video_id.to_string(),
            progress: None,
        });
        self.transfer(
            Stream::Primary,
            &ticket.upload_url,
            plan.primary,
            &plan.request.content_type,
        )
        .await
        .map_err(PipelineError::TransportFailed)?;

        match (plan.secondary, ticket.webcam_upload_url.as_deref()) {
            (Some((blob, mime)), Some(url)) => {
                self.transition(PipelineState::UploadingSecondary {
                    video_id: video_id.to_string(),
                    progress: None,
                });
                self.transfer(Stream::Secondary, url, blob, &mime)
                    .await
                    .map_err(PipelineError::WebcamTransportFailed)?;
            }
            (Some(_), None) => {
                tracing::warn!(
                    video_id = %video_id,
                    "No webcam upload URL issued, skipping webcam stream"
                );
            }
            (None, _) => {}
        }

        self.transition(PipelineState::Finalizing {
            video_id: video_id.to_string(),
        });
        self.api
            .finalize_video(video_id)
            .await
            .map_err(|e| PipelineError::FinalizeFailed(PipelineError::from_chain(&e)))?;

        Ok(ShareDescriptor::new(
            &self.share_origin,
            ticket.video_id.clone(),
            ticket.share_token.clone(),
        ))
    }

    async fn create(&self, plan: &UploadPlan) -> Result<UploadTicket, PipelineError> {
        let response = match plan.endpoint {
            CreateEndpoint::Recording => self.api.create_recording(&plan.request).await,
            CreateEndpoint::File => self.api.create_upload(&plan.request).await,
        };

        match response {
            Ok(Some(ticket)) if ticket.is_usable() => {
                tracing::debug!(
                    video_id = %ticket.video_id,
                    title = %plan.request.title,
                    has_webcam_url = ticket.webcam_upload_url.is_some(),
                    "Video record created"
                );
                Ok(ticket)
            }
            Ok(_) => Err(PipelineError::CreateFailed(
                "server returned no video record".to_string(),
            )),
            Err(e) => Err(PipelineError::CreateFailed(PipelineError::from_chain(&e))),
        }
    }

    /// Drive one transfer and drain its event stream on the same task.
    /// Returns at the first terminal event.
    async fn transfer(
        &self,
        stream: Stream,
        url: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), String> {
        let (events, mut receiver): (TransferSender, TransferReceiver) = mpsc::unbounded_channel();
        let upload = self.transport.upload(url, data, content_type, events);

        let consume = async {
            while let Some(event) = receiver.recv().await {
                match event {
                    TransferEvent::Progress(progress) => {
                        self.state
                            .send_if_modified(|state| state.set_progress(stream, progress));
                    }
                    TransferEvent::Completed => return Ok(()),
                    TransferEvent::Failed { message, .. } => return Err(message),
                }
            }
            Err("transfer ended without a result".to_string())
        };

        let ((), outcome) = tokio::join!(upload, consume);
        outcome
    }
}
