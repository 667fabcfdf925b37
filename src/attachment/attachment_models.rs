use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An image attached to a note. The bytes live in the object store under
/// `object_key`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Attachment {
    pub id: Uuid,
    pub note_id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Multipart form accepted by the upload endpoint. Documentation only; the
/// handler reads the `file` part as a stream.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AttachmentUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
