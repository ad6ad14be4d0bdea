//! Biography store
//!
//! Receptionist edits of a student's short biography. The roster's
//! "Small Biography" column stays the fallback when no edit exists.

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::Student;
use crate::roster::{normalize_admission_number, RosterStore};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct BiographyStore {
    pool: SqlitePool,
}

impl BiographyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored biography, if any
    pub async fn get(&self, admission_number: &str) -> Result<Option<String>> {
        let bio: Option<String> =
            sqlx::query_scalar("SELECT biography FROM biographies WHERE admission_number = ?")
                .bind(normalize_admission_number(admission_number))
                .fetch_optional(&self.pool)
                .await?;
        Ok(bio)
    }

    /// Insert or overwrite the biography of a known student
    ///
    /// Both checks run before anything is written.
    pub async fn upsert(&self, roster: &RosterStore, admission_number: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyBiography);
        }

        let student = roster
            .get(admission_number)
            .ok_or_else(|| Error::UnknownStudent(normalize_admission_number(admission_number)))?;

        self.write(&student.admission_number, text).await?;
        info!(admission_number = %student.admission_number, "Biography updated");
        Ok(())
    }

    async fn write(&self, admission_number: &str, text: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO biographies (admission_number, biography, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(admission_number) DO UPDATE SET
                biography = excluded.biography,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(admission_number)
        .bind(text)
        .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Biography shown on the profile: stored edit, else roster default, else empty
    pub async fn resolve(&self, student: &Student) -> Result<String> {
        Ok(self
            .get(&student.admission_number)
            .await?
            .unwrap_or_else(|| student.default_biography.clone()))
    }

    /// Copy every non-empty roster biography into the store
    ///
    /// One-shot seeding for a fresh database. Existing rows are overwritten
    /// with the roster value. Returns the number of biographies copied.
    pub async fn import_from_roster(&self, roster: &RosterStore) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut count = 0;

        for student in roster.students() {
            let bio = student.default_biography.trim();
            if bio.is_empty() {
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO biographies (admission_number, biography, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(admission_number) DO UPDATE SET
                    biography = excluded.biography,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&student.admission_number)
            .bind(bio)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            count += 1;
        }

        tx.commit().await?;
        info!("Imported {} biographies from roster", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use std::collections::BTreeMap;

    fn student(adm: &str, bio: &str) -> Student {
        Student {
            admission_number: adm.to_string(),
            name: "Test".to_string(),
            department: "Germans".to_string(),
            default_biography: bio.to_string(),
            fields: BTreeMap::new(),
        }
    }

    fn roster() -> RosterStore {
        RosterStore::from_students(vec![student("A100", "Loves reading"), student("B200", "")])
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_roster_then_store_wins() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let roster = roster();
        let a100 = roster.get("A100").unwrap();

        assert_eq!(store.resolve(a100).await.unwrap(), "Loves reading");

        store.upsert(&roster, "A100", "Enjoys chess").await.unwrap();
        assert_eq!(store.resolve(a100).await.unwrap(), "Enjoys chess");
    }

    #[tokio::test]
    async fn test_resolve_empty_when_no_default() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let roster = roster();
        assert_eq!(store.resolve(roster.get("B200").unwrap()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_upsert_unknown_student_writes_nothing() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let err = store.upsert(&roster(), "Z999", "Hello").await.unwrap_err();
        assert!(matches!(err, Error::UnknownStudent(ref adm) if adm == "Z999"));
        assert_eq!(store.get("Z999").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_rejects_blank_text() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let err = store.upsert(&roster(), "A100", "   \n").await.unwrap_err();
        assert!(matches!(err, Error::EmptyBiography));
        assert_eq!(store.get("A100").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_trims() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let roster = roster();
        store.upsert(&roster, "a100", " First ").await.unwrap();
        store.upsert(&roster, "A100", "Second").await.unwrap();
        assert_eq!(store.get("A100").await.unwrap().as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_import_from_roster_skips_empty_biographies() {
        let store = BiographyStore::new(init_memory_database().await.unwrap());
        let copied = store.import_from_roster(&roster()).await.unwrap();
        assert_eq!(copied, 1);
        assert_eq!(store.get("A100").await.unwrap().as_deref(), Some("Loves reading"));
        assert_eq!(store.get("B200").await.unwrap(), None);
    }
}
