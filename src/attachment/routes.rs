use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;
use super::attachment_handlers::{
    delete_attachment, download_attachment, list_attachments, upload_attachment,
};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn attachment_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/notes/:id/attachments",
            get(list_attachments).post(upload_attachment),
        )
        .route(
            "/attachments/:id",
            get(download_attachment).delete(delete_attachment),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
}
