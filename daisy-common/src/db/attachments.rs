//! Attachment metadata store
//!
//! One row per media host resource, keyed by the host's external identifier.
//! Rows are only written after the host confirmed the upload and only removed
//! after the host confirmed the deletion; that ordering is the caller's job
//! (see the upload orchestrator), this module just persists.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::models::{Attachment, Category, NewAttachment};
use crate::roster::normalize_admission_number;
use crate::Result;

const SELECT_COLUMNS: &str =
    "SELECT external_id, admission_number, category, url, note, filename, created_at FROM attachments";

/// Fixed-width RFC 3339 so lexicographic order matches chronological order
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn attachment_from_row(row: &SqliteRow) -> std::result::Result<Attachment, sqlx::Error> {
    let category: String = row.try_get("category")?;
    let category = category
        .parse::<Category>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Attachment {
        external_id: row.try_get("external_id")?,
        admission_number: row.try_get("admission_number")?,
        category,
        url: row.try_get("url")?,
        note: row.try_get("note")?,
        filename: row.try_get("filename")?,
        created_at,
    })
}

/// SQLite-backed attachment metadata
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    pool: SqlitePool,
}

impl AttachmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a record, or return the existing one for the same external id
    ///
    /// Retried uploads that come back with an id we already know must not
    /// produce a second row, and must not overwrite the first.
    pub async fn append(&self, new: NewAttachment) -> Result<Attachment> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO attachments
                (external_id, admission_number, category, url, note, filename, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.external_id)
        .bind(normalize_admission_number(&new.admission_number))
        .bind(new.category.as_str())
        .bind(&new.url)
        .bind(&new.note)
        .bind(&new.filename)
        .bind(format_timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let row = sqlx::query(&format!("{} WHERE external_id = ?", SELECT_COLUMNS))
            .bind(&new.external_id)
            .fetch_one(&mut *tx)
            .await?;
        let attachment = attachment_from_row(&row)?;

        tx.commit().await?;

        if inserted == 0 {
            debug!(external_id = %new.external_id, "Attachment already recorded, insert ignored");
        }

        Ok(attachment)
    }

    /// Attachments of one student in one category, newest first
    pub async fn list(&self, admission_number: &str, category: Category) -> Result<Vec<Attachment>> {
        let rows = sqlx::query(&format!(
            "{} WHERE admission_number = ? AND category = ? ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .bind(normalize_admission_number(admission_number))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;

        let attachments = rows
            .iter()
            .map(attachment_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attachments)
    }

    /// Look up a single record by external id
    pub async fn get(&self, external_id: &str) -> Result<Option<Attachment>> {
        let row = sqlx::query(&format!("{} WHERE external_id = ?", SELECT_COLUMNS))
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(attachment_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete the record for `external_id`; returns whether one existed
    ///
    /// Only call after the media host confirmed the deletion.
    pub async fn remove(&self, external_id: &str) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM attachments WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
