//! Clipcast upload pipeline
//!
//! Turns a finished recording (or a picked file) into a shareable video:
//! create the metadata record, stream the bytes to presigned storage URLs,
//! finalize, and delete the record again if anything after create fails.
//! Batches of files run sequentially behind a quota preflight.

pub mod batch;
pub mod compensation;
pub mod orchestrator;
pub mod progress;
pub mod quota_gate;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use batch::{ActiveFile, BatchSummary, BatchUploader, FileOutcome};
pub use compensation::CompensationManager;
pub use orchestrator::UploadOrchestrator;
pub use progress::{ProgressEvent, TransferEvent, TransferReceiver, TransferSender};
pub use quota_gate::{QuotaDecision, QuotaDenial, QuotaGate};
pub use state::{PipelineState, Stream};
pub use transport::{PresignedTransport, UploadTransport};
