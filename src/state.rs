use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    attachment::{AttachmentRepository, AttachmentService, HttpObjectStore, ObjectStore},
    auth::JwtSettings,
    board::BoardService,
    db::DbPool,
    note::{
        note_models::NoteEvent,
        ranking::{InvalidDeadline, RankingPolicy},
        NoteRepository, NoteService,
    },
    tag::{TagRepository, TagService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: JwtSettings,
    pub note_tx: broadcast::Sender<(Uuid, NoteEvent)>,
    pub note_service: NoteService,
    pub tag_service: TagService,
    pub attachment_service: AttachmentService,
    pub board_service: BoardService,
}

impl AppState {
    /// Wires repositories and services around one pool and one object store.
    pub fn new(db: DbPool, config: Config, store: Arc<dyn ObjectStore>) -> Self {
        let config = Arc::new(config);
        let (note_tx, _) = broadcast::channel(100);

        let note_repository = NoteRepository::new(db.clone());
        let tag_repository = TagRepository::new(db.clone());
        let attachment_repository = AttachmentRepository::new(db.clone());

        let attachment_service = AttachmentService::new(
            attachment_repository,
            note_repository.clone(),
            store,
            config.max_upload_bytes,
        );
        let note_service = NoteService::new(
            db,
            note_repository,
            tag_repository.clone(),
            attachment_service.clone(),
            RankingPolicy {
                invalid_deadline: config.invalid_deadline,
            },
        );
        let tag_service = TagService::new(tag_repository);
        let board_service = BoardService::new(note_service.clone());

        Self {
            jwt: JwtSettings::new(&config.jwt_secret, config.jwt_audience.clone()),
            config,
            note_tx,
            note_service,
            tag_service,
            attachment_service,
            board_service,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub storage_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,
    pub max_upload_bytes: usize,
    pub default_utc_offset: FixedOffset,
    pub invalid_deadline: InvalidDeadline,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn object_store(&self, client: reqwest::Client) -> Arc<dyn ObjectStore> {
        Arc::new(HttpObjectStore::new(
            client,
            self.storage_url.clone(),
            self.storage_bucket.clone(),
            self.storage_service_key.clone(),
        ))
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a number, got `{raw}`"))?,
            None => 10 * 1024 * 1024,
        };

        let default_utc_offset = match lookup("DEFAULT_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = raw.parse().with_context(|| {
                    format!("DEFAULT_UTC_OFFSET_MINUTES must be a number, got `{raw}`")
                })?;
                offset_from_minutes(minutes).ok_or_else(|| {
                    anyhow!("DEFAULT_UTC_OFFSET_MINUTES out of range: {minutes}")
                })?
            }
            None => FixedOffset::east_opt(0).ok_or_else(|| anyhow!("invalid UTC offset"))?,
        };

        let invalid_deadline = match lookup("RANK_INVALID_DEADLINE") {
            Some(raw) => raw.parse::<InvalidDeadline>().map_err(|e| anyhow!(e))?,
            None => InvalidDeadline::default(),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a number, got `{raw}`"))?,
            None => 3000,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_audience: lookup("JWT_AUDIENCE").filter(|aud| !aud.is_empty()),
            storage_url: required("STORAGE_URL")?,
            storage_service_key: required("STORAGE_SERVICE_KEY")?,
            storage_bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| "attachments".to_string()),
            max_upload_bytes,
            default_utc_offset,
            invalid_deadline,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }
}

/// Client clocks are limited to the offsets that exist in practice,
/// UTC-14:00 through UTC+14:00.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if !(-840..=840).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}
