//! # Daisy Common Library
//!
//! Shared code for the Daisy student portal:
//! - Domain types (students, attachment categories, attachments)
//! - Roster loading from the CSV export
//! - SQLite initialization and the attachment/biography stores
//! - Configuration resolution
//! - Error taxonomy

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod roster;

pub use error::{Error, Result};
pub use models::{Attachment, Category, NewAttachment, ResourceKind, Student};
pub use roster::{normalize_admission_number, RosterStore};
