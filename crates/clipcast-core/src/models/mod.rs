//! Data models for the upload pipeline
//!
//! Inputs handed over by the capture UI, the metadata API's request/response
//! shapes, and the quota snapshot.

mod quota;
mod recording;
mod video;

pub use quota::*;
pub use recording::*;
pub use video::*;
