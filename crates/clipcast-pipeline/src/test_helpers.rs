//! In-memory metadata API and transport for pipeline unit tests.
//!
//! Both mocks append to one shared call log so tests can assert ordering
//! across create, PUT, finalize and delete.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use clipcast_core::models::{CreateVideoRequest, Quota, UploadTicket};
use clipcast_core::VideoApi;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::progress::{ProgressEvent, TransferEvent, TransferSender};
use crate::transport::UploadTransport;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateRecording(CreateVideoRequest),
    CreateUpload(CreateVideoRequest),
    Put {
        url: String,
        content_type: String,
        body: Bytes,
    },
    Finalize(String),
    Rename(String, String),
    Delete(String),
    GetLimits,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// How the mock answers create calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBehavior {
    Ticket,
    /// Server answered `null`.
    Null,
    /// Ticket without an upload URL.
    EmptyTicket,
    Error,
}

struct Settings {
    create: CreateBehavior,
    webcam_url: bool,
    finalize_fails: bool,
    delete_fails: bool,
    quota: Option<Quota>,
}

/// Mock metadata API issuing ids `vid_1`, `vid_2`, ... and upload URLs
/// `https://storage.test/{id}/primary` (and `/secondary` for webcam streams).
#[derive(Clone)]
pub struct MockVideoApi {
    log: CallLog,
    settings: Arc<Mutex<Settings>>,
    next_id: Arc<AtomicUsize>,
}

impl MockVideoApi {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            settings: Arc::new(Mutex::new(Settings {
                create: CreateBehavior::Ticket,
                webcam_url: true,
                finalize_fails: false,
                delete_fails: false,
                quota: Some(Quota::default()),
            })),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn with_create(self, behavior: CreateBehavior) -> Self {
        self.set_create(behavior);
        self
    }

    pub fn set_create(&self, behavior: CreateBehavior) {
        self.settings.lock().unwrap().create = behavior;
    }

    /// Never hand out a webcam upload URL, even when a webcam stream is declared.
    pub fn without_webcam_url(self) -> Self {
        self.settings.lock().unwrap().webcam_url = false;
        self
    }

    pub fn failing_finalize(self) -> Self {
        self.settings.lock().unwrap().finalize_fails = true;
        self
    }

    pub fn failing_delete(self) -> Self {
        self.settings.lock().unwrap().delete_fails = true;
        self
    }

    pub fn failing_limits(self) -> Self {
        self.settings.lock().unwrap().quota = None;
        self
    }

    pub fn with_quota(self, quota: Quota) -> Self {
        self.set_quota(quota);
        self
    }

    pub fn set_quota(&self, quota: Quota) {
        self.settings.lock().unwrap().quota = Some(quota);
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    fn ticket(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>> {
        let (behavior, webcam_url) = {
            let settings = self.settings.lock().unwrap();
            (settings.create, settings.webcam_url)
        };
        match behavior {
            CreateBehavior::Null => Ok(None),
            CreateBehavior::Error => Err(anyhow::anyhow!(
                "API request failed with status 500 Internal Server Error: boom"
            )),
            CreateBehavior::EmptyTicket => Ok(Some(UploadTicket {
                video_id: String::new(),
                upload_url: String::new(),
                share_token: String::new(),
                webcam_upload_url: None,
            })),
            CreateBehavior::Ticket => {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                let video_id = format!("vid_{}", n);
                let webcam_upload_url = (webcam_url && request.webcam_file_size.is_some())
                    .then(|| format!("https://storage.test/{}/secondary", video_id));
                Ok(Some(UploadTicket {
                    upload_url: format!("https://storage.test/{}/primary", video_id),
                    share_token: format!("share_{}", video_id),
                    webcam_upload_url,
                    video_id,
                }))
            }
        }
    }
}

impl Default for MockVideoApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoApi for MockVideoApi {
    async fn create_recording(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>> {
        self.record(Call::CreateRecording(request.clone()));
        self.ticket(request)
    }

    async fn create_upload(&self, request: &CreateVideoRequest) -> Result<Option<UploadTicket>> {
        self.record(Call::CreateUpload(request.clone()));
        self.ticket(request)
    }

    async fn finalize_video(&self, video_id: &str) -> Result<()> {
        self.record(Call::Finalize(video_id.to_string()));
        if self.settings.lock().unwrap().finalize_fails {
            return Err(anyhow::anyhow!("API request failed with status 502 Bad Gateway"));
        }
        Ok(())
    }

    async fn rename_video(&self, video_id: &str, title: &str) -> Result<()> {
        self.record(Call::Rename(video_id.to_string(), title.to_string()));
        Ok(())
    }

    async fn delete_video(&self, video_id: &str) -> Result<()> {
        self.record(Call::Delete(video_id.to_string()));
        if self.settings.lock().unwrap().delete_fails {
            return Err(anyhow::anyhow!("API request failed with status 503 Service Unavailable"));
        }
        Ok(())
    }

    async fn get_limits(&self) -> Result<Quota> {
        self.record(Call::GetLimits);
        self.settings
            .lock()
            .unwrap()
            .quota
            .ok_or_else(|| anyhow::anyhow!("Failed to fetch video limits"))
    }
}

/// Mock transport: two progress events then `Completed`, unless the URL
/// matches a configured failure.
#[derive(Clone)]
pub struct MockTransport {
    log: CallLog,
    failures: Arc<Mutex<Vec<(String, Option<u16>)>>>,
}

impl MockTransport {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failures: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every PUT whose URL contains `pattern` with `status` (None = connection error).
    pub fn fail_when(self, pattern: &str, status: Option<u16>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((pattern.to_string(), status));
        self
    }
}

#[async_trait]
impl UploadTransport for MockTransport {
    async fn upload(&self, url: &str, data: Bytes, content_type: &str, events: TransferSender) {
        self.log.lock().unwrap().push(Call::Put {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body: data.clone(),
        });

        let total = data.len() as u64;
        let _ = events.send(TransferEvent::Progress(ProgressEvent::new(total / 2, total)));
        let _ = events.send(TransferEvent::Progress(ProgressEvent::new(total, total)));

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, status)| *status);

        let terminal = match failure {
            None => TransferEvent::Completed,
            Some(status) => TransferEvent::Failed {
                status,
                message: match status {
                    Some(code) => format!("storage responded with status {}", code),
                    None => "storage request failed: connection reset".to_string(),
                },
            },
        };
        let _ = events.send(terminal);
    }
}

/// Transport that pauses after every event, so `watch` subscribers get to see
/// each intermediate state instead of only the last one.
pub struct SlowTransport {
    log: CallLog,
    delay: Duration,
}

impl SlowTransport {
    pub fn new(log: CallLog, delay: Duration) -> Self {
        Self { log, delay }
    }
}

#[async_trait]
impl UploadTransport for SlowTransport {
    async fn upload(&self, url: &str, data: Bytes, content_type: &str, events: TransferSender) {
        self.log.lock().unwrap().push(Call::Put {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body: data.clone(),
        });

        let total = data.len() as u64;
        for loaded in [0, total / 2, total] {
            let _ = events.send(TransferEvent::Progress(ProgressEvent::new(loaded, total)));
            tokio::time::sleep(self.delay).await;
        }
        let _ = events.send(TransferEvent::Completed);
    }
}
