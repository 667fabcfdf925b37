use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    middleware::{AuthUser, ClientClock},
    state::AppState,
    tag::SetNoteTagsRequest,
};
use super::{
    note_dto::{
        paginate, CalendarQuery, CreateNoteRequest, NoteListQuery, NotePage, NoteScope,
        SearchQuery, UpdateNoteRequest, UpdateNoteStatusRequest,
    },
    note_models::{CalendarDay, NoteEvent, NoteEventKind, NoteResponse},
    note_repository::NoteFilters,
    note_service::current_month,
};

fn publish(
    state: &AppState,
    user_id: Uuid,
    kind: NoteEventKind,
    note_id: Uuid,
    note: Option<NoteResponse>,
) {
    // no subscribers is not an error
    let _ = state.note_tx.send((user_id, NoteEvent { kind, note_id, note }));
}

/// List notes for a calendar day, a calendar month or everything, in priority order
#[utoipa::path(
    get,
    path = "/api/notes",
    params(
        ("scope" = Option<String>, Query, description = "day, month or all (default)"),
        ("date" = Option<String>, Query, description = "Day for scope=day (YYYY-MM-DD), default today"),
        ("year" = Option<i32>, Query, description = "Year for scope=month, default this year"),
        ("month" = Option<u32>, Query, description = "Month for scope=month (1-12), default this month"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("tag" = Option<Uuid>, Query, description = "Filter by tag id"),
        ("importance" = Option<String>, Query, description = "Filter by importance"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page (max 100)"),
        ("X-UTC-Offset-Minutes" = Option<i32>, Header, description = "Client UTC offset in minutes")
    ),
    responses(
        (status = 200, description = "Ranked notes", body = NotePage),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn get_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ClientClock(clock): ClientClock,
    Query(query): Query<NoteListQuery>,
) -> Result<Json<NotePage>> {
    let scope = NoteScope::from_query(&query, clock.today())?;
    let filters = NoteFilters {
        status: query.status,
        importance: query.importance,
        tag_id: query.tag,
    };

    let notes = state
        .note_service
        .list_notes(user_id, scope, filters, &clock)
        .await?;

    Ok(Json(paginate(notes, query.page, query.limit)))
}

/// Get a note
#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn get_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<NoteResponse>> {
    let note = state.note_service.get_note(user_id, note_id).await?;
    Ok(Json(note))
}

/// Create a note
#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn create_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ClientClock(clock): ClientClock,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let note = state.note_service.create_note(user_id, payload, &clock).await?;

    publish(&state, user_id, NoteEventKind::Created, note.note.id, Some(note.clone()));

    Ok((StatusCode::CREATED, Json(note)))
}

/// Update a note
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn update_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>> {
    payload.validate()?;

    let note = state.note_service.update_note(user_id, note_id, payload).await?;

    publish(&state, user_id, NoteEventKind::Updated, note_id, Some(note.clone()));

    Ok(Json(note))
}

/// Move a note to another board column
#[utoipa::path(
    patch,
    path = "/api/notes/{id}/status",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = UpdateNoteStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = NoteResponse),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn update_note_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<UpdateNoteStatusRequest>,
) -> Result<Json<NoteResponse>> {
    let note = state
        .note_service
        .update_status(user_id, note_id, payload.status)
        .await?;

    publish(&state, user_id, NoteEventKind::Updated, note_id, Some(note.clone()));

    Ok(Json(note))
}

/// Replace the tags of a note
#[utoipa::path(
    put,
    path = "/api/notes/{id}/tags",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = SetNoteTagsRequest,
    responses(
        (status = 200, description = "Tags replaced", body = NoteResponse),
        (status = 400, description = "Unknown tag id"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn set_note_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<SetNoteTagsRequest>,
) -> Result<Json<NoteResponse>> {
    payload.validate()?;

    let note = state
        .note_service
        .set_note_tags(user_id, note_id, payload.tag_ids)
        .await?;

    publish(&state, user_id, NoteEventKind::Updated, note_id, Some(note.clone()));

    Ok(Json(note))
}

/// Delete a note with its attachments
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.note_service.delete_note(user_id, note_id).await?;

    publish(&state, user_id, NoteEventKind::Deleted, note_id, None);

    Ok(StatusCode::NO_CONTENT)
}

/// Full-text search over titles, content and tag names, in priority order
#[utoipa::path(
    get,
    path = "/api/notes/search",
    params(
        ("q" = String, Query, description = "Search text"),
        ("limit" = Option<u32>, Query, description = "Maximum hits (max 100)"),
        ("X-UTC-Offset-Minutes" = Option<i32>, Header, description = "Client UTC offset in minutes")
    ),
    responses(
        (status = 200, description = "Matching notes", body = Vec<NoteResponse>),
        (status = 400, description = "Empty query")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn search_notes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ClientClock(clock): ClientClock,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NoteResponse>>> {
    let notes = state
        .note_service
        .search(user_id, &query.q, query.limit, &clock)
        .await?;
    Ok(Json(notes))
}

/// Note counts per day of a month
#[utoipa::path(
    get,
    path = "/api/notes/calendar",
    params(
        ("year" = Option<i32>, Query, description = "Year, default this year"),
        ("month" = Option<u32>, Query, description = "Month (1-12), default this month")
    ),
    responses(
        (status = 200, description = "Days with notes", body = Vec<CalendarDay>),
        (status = 400, description = "Invalid month")
    ),
    tag = "notes",
    security(("bearer_auth" = []))
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ClientClock(clock): ClientClock,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDay>>> {
    let (this_year, this_month) = current_month(&clock);
    let year = query.year.unwrap_or(this_year);
    let month = query.month.unwrap_or(this_month);

    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!("Invalid month: {month}")));
    }

    let days = state
        .note_service
        .calendar_summary(user_id, year, month)
        .await?;
    Ok(Json(days))
}

/// Real-time note changes (SSE)
#[utoipa::path(
    get,
    path = "/api/notes/stream",
    tag = "notes",
    responses(
        (status = 200, description = "Note event stream established"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn note_stream(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, std::convert::Infallible>>> {
    let stream = owned_events(state.note_tx.subscribe(), user_id)
        .map(|json| Ok(Event::default().event("note").data(json)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// JSON payloads of the events that belong to `user_id`. Other users' events
/// and lag notices are skipped.
fn owned_events(
    rx: broadcast::Receiver<(Uuid, NoteEvent)>,
    user_id: Uuid,
) -> impl Stream<Item = String> {
    BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok((owner, event)) if owner == user_id => serde_json::to_string(&event).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted(note_id: Uuid) -> NoteEvent {
        NoteEvent {
            kind: NoteEventKind::Deleted,
            note_id,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_stream_only_carries_own_events() {
        let (tx, rx) = broadcast::channel(16);
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();

        let events = owned_events(rx, me);

        tx.send((someone_else, deleted(theirs))).expect("send");
        tx.send((me, deleted(mine))).expect("send");
        drop(tx);

        let received: Vec<String> = events.collect().await;

        assert_eq!(received.len(), 1);
        let json: serde_json::Value = serde_json::from_str(&received[0]).expect("json");
        assert_eq!(json["kind"], "deleted");
        assert_eq!(json["note_id"], mine.to_string());
    }
}
