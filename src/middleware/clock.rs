use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    error::AppError,
    note::ranking::RankClock,
    state::{offset_from_minutes, AppState},
};

pub const UTC_OFFSET_HEADER: &str = "x-utc-offset-minutes";

/// The caller's notion of "now". Reads the client's UTC offset in minutes
/// from `X-UTC-Offset-Minutes`, falling back to the configured default.
pub struct ClientClock(pub RankClock);

#[async_trait]
impl FromRequestParts<AppState> for ClientClock {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let offset = match parts.headers.get(UTC_OFFSET_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<i32>().ok())
                .and_then(offset_from_minutes)
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "{UTC_OFFSET_HEADER} must be whole minutes between -840 and 840"
                    ))
                })?,
            None => state.config.default_utc_offset,
        };

        Ok(ClientClock(RankClock::now_in(offset)))
    }
}
