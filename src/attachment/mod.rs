pub mod attachment_models;
pub mod attachment_repository;
pub mod attachment_handlers;
pub mod attachment_service;
pub mod storage;
pub mod routes;

pub use attachment_models::{Attachment, AttachmentUpload};
pub use attachment_repository::AttachmentRepository;
pub use attachment_service::AttachmentService;
pub use storage::{HttpObjectStore, ObjectStore};
