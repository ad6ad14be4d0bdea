//! Domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const RESULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "pdf", "doc", "docx"];
const LETTER_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Student snapshot loaded from the roster
///
/// Never mutated after load. Biography edits live in the biography store
/// and are overlaid at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Trimmed, uppercased admission number
    pub admission_number: String,
    pub name: String,
    pub department: String,
    /// Roster "Small Biography" column
    pub default_biography: String,
    /// Remaining roster columns, verbatim
    pub fields: BTreeMap<String, String>,
}

/// Attachment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gallery,
    Result,
    Letter,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Gallery, Category::Result, Category::Letter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gallery => "gallery",
            Category::Result => "result",
            Category::Letter => "letter",
        }
    }

    /// Lowercase extensions accepted for this category
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Gallery => IMAGE_EXTENSIONS,
            Category::Result => RESULT_EXTENSIONS,
            Category::Letter => LETTER_EXTENSIONS,
        }
    }

    /// Top-level folder name handed to the media host
    pub fn media_folder(&self) -> &'static str {
        match self {
            Category::Gallery => "gallery",
            Category::Result => "results",
            Category::Letter => "letters",
        }
    }

    /// Media host resource kind; letters are stored as raw documents
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            Category::Letter => ResourceKind::Raw,
            Category::Gallery | Category::Result => ResourceKind::Image,
        }
    }

    /// Whether `filename` carries an extension allowed for this category
    pub fn accepts_filename(&self, filename: &str) -> bool {
        match file_extension(filename) {
            Some(ext) => self.allowed_extensions().contains(&ext.as_str()),
            None => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gallery" => Ok(Category::Gallery),
            "result" => Ok(Category::Result),
            "letter" => Ok(Category::Letter),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Media host resource hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Raw,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased suffix after the last `.`, if any
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.trim().rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Stored attachment metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Identifier assigned by the media host
    pub external_id: String,
    pub admission_number: String,
    pub category: Category,
    pub url: String,
    pub note: Option<String>,
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attachment insert payload
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub external_id: String,
    pub admission_number: String,
    pub category: Category,
    pub url: String,
    pub note: Option<String>,
    pub filename: Option<String>,
}
