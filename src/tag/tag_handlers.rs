use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::Result,
    middleware::AuthUser,
    state::AppState,
};
use super::{
    tag_dto::{CreateTagRequest, UpdateTagRequest},
    tag_models::Tag,
};

/// List the user's tags, by name
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "List of tags", body = Vec<Tag>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn get_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Tag>>> {
    let tags = state.tag_service.list_tags(user_id).await?;
    Ok(Json(tags))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Tag name already in use")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let tag = state.tag_service.create_tag(user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Rename or recolor a tag
#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag id")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Tag name already in use")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn update_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(tag_id): Path<Uuid>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<Json<Tag>> {
    payload.validate()?;

    let tag = state.tag_service.update_tag(user_id, tag_id, payload).await?;
    Ok(Json(tag))
}

/// Delete a tag; it is removed from every note
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(tag_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.tag_service.delete_tag(user_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
