//! Upload orchestration
//!
//! Validates incoming files against the category allow-list, forwards them
//! to the media host and records metadata for every confirmed upload.
//! Deletion is two-phase: the media host first, the local record only after
//! the host confirmed.

use std::sync::Arc;

use daisy_common::db::AttachmentStore;
use daisy_common::{normalize_admission_number, Category, Error, NewAttachment, Result, RosterStore};
use serde::Serialize;
use tracing::{error, info, warn};

use super::media_host::{MediaHost, UploadRequest};

/// One file of an upload batch
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Per-batch result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub accepted: usize,
    pub rejected: usize,
}

pub struct UploadOrchestrator {
    roster: Arc<RosterStore>,
    attachments: AttachmentStore,
    media: Arc<dyn MediaHost>,
}

impl UploadOrchestrator {
    pub fn new(roster: Arc<RosterStore>, attachments: AttachmentStore, media: Arc<dyn MediaHost>) -> Self {
        Self {
            roster,
            attachments,
            media,
        }
    }

    /// Upload a batch of files for one student
    ///
    /// Files with blank names are ignored. A disallowed extension or a failed
    /// host call rejects that file only; the rest of the batch continues.
    /// Fails as a whole for an unknown student, an empty batch, or a
    /// storage error. On a storage error the file being recorded is removed
    /// from the host again; files recorded earlier in the batch are kept.
    pub async fn submit(
        &self,
        admission_number: &str,
        category: Category,
        files: Vec<IncomingFile>,
        note: Option<&str>,
    ) -> Result<UploadOutcome> {
        let student = self
            .roster
            .get(admission_number)
            .ok_or_else(|| Error::UnknownStudent(normalize_admission_number(admission_number)))?;
        let admission_number = student.admission_number.clone();

        let files: Vec<IncomingFile> = files
            .into_iter()
            .filter(|f| !f.filename.trim().is_empty())
            .collect();
        if files.is_empty() {
            return Err(Error::NoFilesProvided);
        }

        let note = note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        let folder = format!("{}/{}", category.media_folder(), admission_number);
        let mut outcome = UploadOutcome::default();

        for file in files {
            let filename = file.filename.trim().to_string();

            if !category.accepts_filename(&filename) {
                warn!(
                    admission_number = %admission_number,
                    category = %category,
                    filename = %filename,
                    "Rejected upload: extension not allowed"
                );
                outcome.rejected += 1;
                continue;
            }

            let request = UploadRequest {
                content: file.content,
                filename: filename.clone(),
                folder: folder.clone(),
                resource: category.resource_kind(),
            };

            let uploaded = match self.media.upload(request).await {
                Ok(uploaded) => uploaded,
                Err(e) => {
                    let err = Error::RemoteUploadFailed(e.to_string());
                    warn!(
                        admission_number = %admission_number,
                        filename = %filename,
                        "{}",
                        err
                    );
                    outcome.rejected += 1;
                    continue;
                }
            };

            let recorded = self
                .attachments
                .append(NewAttachment {
                    external_id: uploaded.external_id.clone(),
                    admission_number: admission_number.clone(),
                    category,
                    url: uploaded.url,
                    note: note.clone(),
                    filename: Some(filename),
                })
                .await;

            if let Err(e) = recorded {
                error!(
                    admission_number = %admission_number,
                    category = %category,
                    accepted = outcome.accepted,
                    rejected = outcome.rejected,
                    "Recording upload failed, aborting batch: {}",
                    e
                );
                // Leave no unrecorded media behind on the host
                if let Err(destroy_err) = self
                    .media
                    .destroy(&uploaded.external_id, category.resource_kind())
                    .await
                {
                    warn!(
                        external_id = %uploaded.external_id,
                        "Failed to remove unrecorded upload: {}",
                        destroy_err
                    );
                }
                return Err(e);
            }
            outcome.accepted += 1;
        }

        info!(
            admission_number = %admission_number,
            category = %category,
            accepted = outcome.accepted,
            rejected = outcome.rejected,
            "Upload batch processed"
        );
        Ok(outcome)
    }

    /// Delete a file from the media host, then its local record
    ///
    /// A host failure leaves the local record intact so the caller can retry.
    /// Returns whether a local record existed.
    pub async fn retract(&self, external_id: &str, category: Category) -> Result<bool> {
        self.media
            .destroy(external_id, category.resource_kind())
            .await
            .map_err(|e| {
                warn!(external_id, category = %category, "Remote delete failed: {}", e);
                Error::RemoteDeleteFailed(e.to_string())
            })?;

        let removed = self.attachments.remove(external_id).await?;
        info!(external_id, category = %category, removed, "Attachment retracted");
        Ok(removed)
    }
}
