use std::{future::Future, sync::Arc};

use axum::body::Bytes;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::note::note_repository::NoteRepository;
use super::{
    attachment_models::Attachment,
    attachment_repository::AttachmentRepository,
    storage::{object_key, sniff_image_type, ObjectStore},
};

/// Image attachments: bytes go to the object store, metadata to the
/// `attachments` table.
#[derive(Clone)]
pub struct AttachmentService {
    repo: AttachmentRepository,
    notes: NoteRepository,
    store: Arc<dyn ObjectStore>,
    max_upload_bytes: usize,
}

impl AttachmentService {
    pub fn new(
        repo: AttachmentRepository,
        notes: NoteRepository,
        store: Arc<dyn ObjectStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            repo,
            notes,
            store,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn upload(
        &self,
        user_id: Uuid,
        note_id: Uuid,
        file_name: Option<String>,
        data: Bytes,
    ) -> Result<Attachment> {
        if !self.notes.exists(note_id, user_id).await? {
            return Err(AppError::NotFound("Note not found".into()));
        }

        let content_type = check_upload(&data, self.max_upload_bytes)?;
        let file_name = clean_file_name(file_name.as_deref());

        let attachment_id = Uuid::new_v4();
        let key = object_key(user_id, note_id, attachment_id);
        let size = data.len() as i64;

        let record = self
            .repo
            .create(attachment_id, note_id, user_id, &key, &file_name, content_type, size);
        let attachment =
            put_then_record(self.store.as_ref(), &key, data, content_type, record).await?;

        tracing::info!(
            attachment_id = %attachment.id,
            %note_id,
            size,
            content_type,
            "Attachment uploaded"
        );
        Ok(attachment)
    }

    pub async fn list_for_note(&self, user_id: Uuid, note_id: Uuid) -> Result<Vec<Attachment>> {
        if !self.notes.exists(note_id, user_id).await? {
            return Err(AppError::NotFound("Note not found".into()));
        }
        self.repo.find_by_note(note_id, user_id).await
    }

    pub async fn download(&self, user_id: Uuid, attachment_id: Uuid) -> Result<(Attachment, Bytes)> {
        let attachment = self.find(user_id, attachment_id).await?;
        let data = self.store.get(&attachment.object_key).await?;
        Ok((attachment, data))
    }

    pub async fn delete(&self, user_id: Uuid, attachment_id: Uuid) -> Result<Attachment> {
        let attachment = self.find(user_id, attachment_id).await?;
        self.store.delete(&attachment.object_key).await?;
        self.repo.delete(attachment.id, user_id).await?;
        Ok(attachment)
    }

    /// Removes the stored objects of every attachment on a note. The rows
    /// go away with the note through the foreign-key cascade.
    pub async fn purge_note(&self, user_id: Uuid, note_id: Uuid) -> Result<usize> {
        let attachments = self.repo.find_by_note(note_id, user_id).await?;
        let keys: Vec<&str> = attachments.iter().map(|a| a.object_key.as_str()).collect();
        delete_objects(self.store.as_ref(), note_id, &keys).await?;
        Ok(attachments.len())
    }

    pub async fn count_for_notes(&self, note_ids: &[Uuid]) -> Result<Vec<(Uuid, i64)>> {
        self.repo.count_for_notes(note_ids).await
    }

    async fn find(&self, user_id: Uuid, attachment_id: Uuid) -> Result<Attachment> {
        self.repo
            .find_by_id(attachment_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".into()))
    }
}

/// Stores the bytes, then runs `record`. When recording fails the object is
/// deleted again so the store holds nothing without a row.
async fn put_then_record<T, F>(
    store: &dyn ObjectStore,
    key: &str,
    data: Bytes,
    content_type: &str,
    record: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    store.put(key, data, content_type).await?;

    match record.await {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(cleanup) = store.delete(key).await {
                tracing::warn!(key, error = %cleanup, "Failed to remove orphaned object");
            }
            Err(e)
        }
    }
}

/// Deletes objects in order and stops at the first failure, logging the key
/// that failed. Keys before it are already gone; retrying is safe because
/// deleting a missing object succeeds.
async fn delete_objects(store: &dyn ObjectStore, note_id: Uuid, keys: &[&str]) -> Result<()> {
    for key in keys {
        if let Err(e) = store.delete(key).await {
            tracing::error!(%note_id, key, error = %e, "Failed to delete stored object; note kept");
            return Err(e);
        }
    }
    Ok(())
}

/// Size and type gate for uploaded bytes. Returns the sniffed content type.
pub fn check_upload(data: &[u8], max_bytes: usize) -> Result<&'static str> {
    if data.is_empty() {
        return Err(AppError::BadRequest("No file data provided".into()));
    }
    if data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the {max_bytes} byte limit"
        )));
    }
    sniff_image_type(data).ok_or_else(|| {
        AppError::UnsupportedMediaType("Only PNG, JPEG, GIF and WebP images are accepted".into())
    })
}

/// Keeps the last path segment, drops quotes and control characters, and
/// caps the length at 255 characters.
pub fn clean_file_name(raw: Option<&str>) -> String {
    let base = raw
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(255)
        .collect();

    if cleaned.trim().is_empty() {
        "image".to_string()
    } else {
        cleaned.trim().to_string()
    }
}
