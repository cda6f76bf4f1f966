//! Transfer progress events.

use serde::Serialize;
use tokio::sync::mpsc;

/// Bytes handed to the HTTP stack so far for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub loaded: u64,
    pub total: u64,
    pub percent: u8,
}

impl ProgressEvent {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (loaded.min(total) * 100 / total) as u8
        };
        Self {
            loaded,
            total,
            percent,
        }
    }
}

/// One item of a transfer's event stream: any number of `Progress` events
/// followed by exactly one terminal `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress(ProgressEvent),
    Completed,
    Failed {
        /// HTTP status when storage answered, `None` for connection-level errors.
        status: Option<u16>,
        message: String,
    },
}

impl TransferEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferEvent::Progress(_))
    }
}

pub type TransferSender = mpsc::UnboundedSender<TransferEvent>;
pub type TransferReceiver = mpsc::UnboundedReceiver<TransferEvent>;
