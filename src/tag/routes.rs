use axum::{routing::{get, put}, Router};

use crate::state::AppState;
use super::tag_handlers::{create_tag, delete_tag, get_tags, update_tag};

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_tags).post(create_tag))
        .route("/:id", put(update_tag).delete(delete_tag))
}
