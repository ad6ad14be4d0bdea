//! Database initialization and persisted stores

pub mod attachments;
pub mod biographies;
pub mod init;
pub mod migrations;

pub use attachments::AttachmentStore;
pub use biographies::BiographyStore;
pub use init::*;
pub use migrations::run_migrations;
