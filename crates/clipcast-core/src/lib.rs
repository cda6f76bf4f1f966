//! Clipcast Core Library
//!
//! Domain models, the pipeline error taxonomy, client configuration and the
//! metadata API trait shared by the client, pipeline and CLI crates.

pub mod config;
pub mod error;
pub mod models;
pub mod video_api;

// Re-export commonly used types
pub use config::{Auth, ClientConfig};
pub use error::{ErrorMetadata, FailureReason, LogLevel, PipelineError};
pub use video_api::VideoApi;
