use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::note_models::{Importance, NoteResponse, NoteStatus};
use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(max = 100000))]
    pub content: Option<String>,
    /// Diary day; defaults to the caller's today.
    pub note_date: Option<NaiveDate>,
    /// `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM[:SS]` or RFC 3339.
    pub deadline: Option<String>,
    pub importance: Option<Importance>,
    pub status: Option<NoteStatus>,
    #[validate(length(max = 50))]
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Partial update. For `deadline` and `importance`, an explicit `null`
/// clears the value while an absent field leaves it unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 100000))]
    pub content: Option<String>,
    pub note_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub deadline: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Importance>)]
    pub importance: Option<Option<Importance>>,
    pub status: Option<NoteStatus>,
}

/// Marks a field that was present in the body, even as `null`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNoteStatusRequest {
    pub status: NoteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Day,
    Month,
    All,
}

#[derive(Debug, Deserialize)]
pub struct NoteListQuery {
    pub scope: Option<ScopeKind>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<NoteStatus>,
    pub tag: Option<Uuid>,
    pub importance: Option<Importance>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<u32>,
}

/// Which diary days a listing covers. Ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    Day(NaiveDate),
    Month { first: NaiveDate, last: NaiveDate },
    All,
}

impl NoteScope {
    /// Missing `date`, `year` or `month` default to the caller's today.
    pub fn from_query(query: &NoteListQuery, today: NaiveDate) -> Result<Self> {
        match query.scope.unwrap_or(ScopeKind::All) {
            ScopeKind::Day => Ok(NoteScope::Day(query.date.unwrap_or(today))),
            ScopeKind::Month => {
                let (first, last) = month_bounds(
                    query.year.unwrap_or(today.year()),
                    query.month.unwrap_or(today.month()),
                )?;
                Ok(NoteScope::Month { first, last })
            }
            ScopeKind::All => Ok(NoteScope::All),
        }
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            NoteScope::Day(day) => Some((day, day)),
            NoteScope::Month { first, last } => Some((first, last)),
            NoteScope::All => None,
        }
    }
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {year}-{month:02}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {year}-{month:02}")))?;
    Ok((first, last))
}

#[derive(Debug, Serialize, ToSchema)]
#[aliases(NotePage = PaginatedResponse<NoteResponse>)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Slices an already ordered list. `page` is 1-based; `limit` is clamped to
/// `1..=MAX_PAGE_SIZE`.
pub fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>) -> PaginatedResponse<T> {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = total.div_ceil(limit as usize) as u32;

    let skip = (page as usize - 1).saturating_mul(limit as usize);
    let data = items.into_iter().skip(skip).take(limit as usize).collect();

    PaginatedResponse {
        data,
        total: total as i64,
        page,
        limit,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn query(scope: Option<ScopeKind>) -> NoteListQuery {
        NoteListQuery {
            scope,
            date: None,
            year: None,
            month: None,
            status: None,
            tag: None,
            importance: None,
            page: None,
            limit: None,
        }
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2026, 2).expect("feb"), (date(2026, 2, 1), date(2026, 2, 28)));
        assert_eq!(month_bounds(2028, 2).expect("leap feb"), (date(2028, 2, 1), date(2028, 2, 29)));
        assert_eq!(month_bounds(2026, 12).expect("dec"), (date(2026, 12, 1), date(2026, 12, 31)));
        assert!(matches!(month_bounds(2026, 13), Err(AppError::Validation(_))));
        assert!(month_bounds(2026, 0).is_err());
    }

    #[test]
    fn test_scope_defaults_to_today() {
        let today = date(2026, 10, 16);

        assert_eq!(NoteScope::from_query(&query(None), today).expect("all"), NoteScope::All);
        assert_eq!(
            NoteScope::from_query(&query(Some(ScopeKind::Day)), today).expect("day"),
            NoteScope::Day(today)
        );

        let month = NoteScope::from_query(&query(Some(ScopeKind::Month)), today).expect("month");
        assert_eq!(month.date_range(), Some((date(2026, 10, 1), date(2026, 10, 31))));
    }

    #[test]
    fn test_scope_explicit_values() {
        let mut q = query(Some(ScopeKind::Month));
        q.year = Some(2025);
        q.month = Some(4);
        let scope = NoteScope::from_query(&q, date(2026, 10, 16)).expect("month");
        assert_eq!(scope.date_range(), Some((date(2025, 4, 1), date(2025, 4, 30))));

        let mut q = query(Some(ScopeKind::Day));
        q.date = Some(date(2026, 1, 3));
        let scope = NoteScope::from_query(&q, date(2026, 10, 16)).expect("day");
        assert_eq!(scope.date_range(), Some((date(2026, 1, 3), date(2026, 1, 3))));
        assert_eq!(NoteScope::All.date_range(), None);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=7).collect();

        let first = paginate(items.clone(), None, Some(3));
        assert_eq!(first.data, vec![1, 2, 3]);
        assert_eq!(first.total, 7);
        assert_eq!(first.total_pages, 3);

        let last = paginate(items.clone(), Some(3), Some(3));
        assert_eq!(last.data, vec![7]);

        let beyond = paginate(items.clone(), Some(9), Some(3));
        assert!(beyond.data.is_empty());

        let clamped = paginate(items, Some(0), Some(0));
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.limit, 1);
        assert_eq!(clamped.data, vec![1]);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<u32>::new(), None, None);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateNoteRequest = serde_json::from_str(r#"{"title":"x"}"#).expect("parse");
        assert_eq!(absent.deadline, None);
        assert_eq!(absent.importance, None);

        let cleared: UpdateNoteRequest =
            serde_json::from_str(r#"{"deadline":null,"importance":null}"#).expect("parse");
        assert_eq!(cleared.deadline, Some(None));
        assert_eq!(cleared.importance, Some(None));

        let set: UpdateNoteRequest =
            serde_json::from_str(r#"{"deadline":"2026-10-20","importance":"LOW"}"#).expect("parse");
        assert_eq!(set.deadline, Some(Some("2026-10-20".to_string())));
        assert_eq!(set.importance, Some(Some(Importance::Low)));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateNoteRequest =
            serde_json::from_str(r#"{"title":""}"#).expect("parse");
        assert!(req.validate().is_err());

        let req: CreateNoteRequest =
            serde_json::from_str(r#"{"title":"Groceries","status":"IN_PROGRESS"}"#).expect("parse");
        assert!(req.validate().is_ok());
        assert_eq!(req.status, Some(NoteStatus::InProgress));
    }
}
