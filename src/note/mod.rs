pub mod note_models;
pub mod note_dto;
pub mod note_repository;
pub mod note_handlers;
pub mod note_service;
pub mod ranking;
pub mod routes;

pub use note_models::{CalendarDay, Importance, Note, NoteEvent, NoteEventKind, NoteResponse, NoteStatus};
pub use note_dto::{CreateNoteRequest, UpdateNoteRequest, UpdateNoteStatusRequest};
pub use note_repository::NoteRepository;
pub use note_service::NoteService;
