pub mod tag_models;
pub mod tag_dto;
pub mod tag_repository;
pub mod tag_handlers;
pub mod tag_service;
pub mod routes;

pub use tag_models::Tag;
pub use tag_dto::{CreateTagRequest, SetNoteTagsRequest, UpdateTagRequest};
pub use tag_repository::TagRepository;
pub use tag_service::TagService;
