use axum::{extract::State, Json};

use crate::{
    error::Result,
    middleware::{AuthUser, ClientClock},
    state::AppState,
};
use super::board_models::Board;

/// Kanban board: notes grouped by status, each column in priority order
#[utoipa::path(
    get,
    path = "/api/board",
    params(
        ("X-UTC-Offset-Minutes" = Option<i32>, Header, description = "Client UTC offset in minutes")
    ),
    responses(
        (status = 200, description = "Board columns", body = Board),
        (status = 401, description = "Unauthorized")
    ),
    tag = "board",
    security(("bearer_auth" = []))
)]
pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ClientClock(clock): ClientClock,
) -> Result<Json<Board>> {
    let board = state.board_service.board(user_id, &clock).await?;
    Ok(Json(board))
}
