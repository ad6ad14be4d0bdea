//! Services: media host integration and upload orchestration

pub mod media_host;
pub mod upload_orchestrator;

pub use media_host::{CloudinaryClient, MediaHost, MediaHostError, UploadRequest, UploadedMedia};
pub use upload_orchestrator::{IncomingFile, UploadOrchestrator, UploadOutcome};
