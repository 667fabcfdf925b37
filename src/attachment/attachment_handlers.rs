use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    note::{NoteEvent, NoteEventKind},
    state::AppState,
};
use super::attachment_models::Attachment;

const FILE_FIELD: &str = "file";

/// Reads the `file` part, refusing it as soon as it outgrows `max_bytes`.
async fn read_file_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<(Option<String>, Bytes)> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if data.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the {max_bytes} byte limit"
                )));
            }
            data.extend_from_slice(&chunk);
        }
        return Ok((file_name, Bytes::from(data)));
    }

    Err(AppError::BadRequest(format!("Missing `{FILE_FIELD}` part")))
}

async fn notify_note_changed(state: &AppState, user_id: Uuid, note_id: Uuid) {
    match state.note_service.get_note(user_id, note_id).await {
        Ok(note) => {
            let event = NoteEvent {
                kind: NoteEventKind::Updated,
                note_id,
                note: Some(note),
            };
            let _ = state.note_tx.send((user_id, event));
        }
        Err(e) => tracing::debug!(%note_id, error = %e, "Skipping note event"),
    }
}

/// Attach an image to a note
#[utoipa::path(
    post,
    path = "/api/notes/{id}/attachments",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body(content = AttachmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Attachment stored", body = Attachment),
        (status = 400, description = "Missing or malformed file part"),
        (status = 404, description = "Note not found"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Not a supported image")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn upload_attachment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let max_bytes = state.attachment_service.max_upload_bytes();
    let (file_name, data) = read_file_field(&mut multipart, max_bytes).await?;

    let attachment = state
        .attachment_service
        .upload(user_id, note_id, file_name, data)
        .await?;

    notify_note_changed(&state, user_id, note_id).await;

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// List the attachments of a note
#[utoipa::path(
    get,
    path = "/api/notes/{id}/attachments",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Attachments, oldest first", body = Vec<Attachment>),
        (status = 404, description = "Note not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn list_attachments(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<Attachment>>> {
    let attachments = state
        .attachment_service
        .list_for_note(user_id, note_id)
        .await?;
    Ok(Json(attachments))
}

/// Download an attachment's image bytes
#[utoipa::path(
    get,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Attachment not found"),
        (status = 502, description = "Storage service error")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn download_attachment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (attachment, data) = state
        .attachment_service
        .download(user_id, attachment_id)
        .await?;

    let headers = [
        (CONTENT_TYPE, attachment.content_type),
        (
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", attachment.file_name),
        ),
    ];

    Ok((headers, data))
}

/// Delete an attachment
#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "attachments",
    security(("bearer_auth" = []))
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Result<StatusCode> {
    let attachment = state
        .attachment_service
        .delete(user_id, attachment_id)
        .await?;

    notify_note_changed(&state, user_id, attachment.note_id).await;

    Ok(StatusCode::NO_CONTENT)
}
