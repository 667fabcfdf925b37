//! Note priority ordering.
//!
//! Every note listing (calendar day, calendar month, all notes, search,
//! board columns) is returned in the order produced by [`rank`]:
//!
//! 1. deadline urgency bucket, ascending ([`UrgencyBucket`]);
//! 2. importance score, descending (HIGH 3, MEDIUM 2, LOW 1, none 0);
//! 3. creation time, ascending.
//!
//! The sort is stable, so notes equal on all three keys keep their input
//! order. Ranking never fails: deadlines that do not parse and missing
//! creation times fall back according to [`RankingPolicy`].

use std::cmp::Reverse;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use super::note_models::Importance;

/// Deadline urgency classes. Lower sorts first.
///
/// `NoDeadline` sits between `DueThisWeek` and `DueLater`: unscheduled
/// notes outrank far-future ones but not anything due within seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrgencyBucket {
    Overdue = 1,
    DueToday = 2,
    DueTomorrow = 3,
    DueThisWeek = 4,
    NoDeadline = 5,
    DueLater = 6,
}

impl UrgencyBucket {
    pub fn from_days_until(days: i64) -> Self {
        match days {
            d if d < 0 => UrgencyBucket::Overdue,
            0 => UrgencyBucket::DueToday,
            1 => UrgencyBucket::DueTomorrow,
            2..=7 => UrgencyBucket::DueThisWeek,
            _ => UrgencyBucket::DueLater,
        }
    }
}

/// How a stored deadline that cannot be parsed is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidDeadline {
    #[default]
    NoDeadline,
    Overdue,
}

impl FromStr for InvalidDeadline {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no_deadline" => Ok(InvalidDeadline::NoDeadline),
            "overdue" => Ok(InvalidDeadline::Overdue),
            other => Err(format!(
                "unknown invalid-deadline policy `{other}` (expected `no_deadline` or `overdue`)"
            )),
        }
    }
}

/// Fallbacks applied when a note's timestamps are unusable.
///
/// A missing creation time always ranks as the earliest representable
/// instant; only the deadline fallback is configurable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingPolicy {
    pub invalid_deadline: InvalidDeadline,
}

/// Fields the ranker reads. Everything else on a note is opaque to it.
pub trait Rankable {
    fn deadline(&self) -> Option<&str>;
    fn importance(&self) -> Option<Importance>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn deadline(&self) -> Option<&str> {
        (**self).deadline()
    }

    fn importance(&self) -> Option<Importance> {
        (**self).importance()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        (**self).created_at()
    }
}

/// "Now" as seen by the caller: the instant plus the UTC offset whose
/// calendar decides what "today" is.
#[derive(Debug, Clone, Copy)]
pub struct RankClock {
    offset: FixedOffset,
    today: NaiveDate,
}

impl RankClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            offset,
            today: now.with_timezone(&offset).date_naive(),
        }
    }

    pub fn now_in(offset: FixedOffset) -> Self {
        Self::new(Utc::now(), offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar day of a deadline string in the given offset.
///
/// RFC 3339 values are converted into `offset` before the date is taken;
/// naive date-times and plain dates are read as already local.
pub fn deadline_day(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&offset).date_naive());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(local.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn urgency_bucket(
    deadline: Option<&str>,
    clock: &RankClock,
    policy: &RankingPolicy,
) -> UrgencyBucket {
    let raw = match deadline {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return UrgencyBucket::NoDeadline,
    };

    match deadline_day(raw, clock.offset) {
        Some(day) => UrgencyBucket::from_days_until((day - clock.today).num_days()),
        None => {
            tracing::debug!(deadline = %raw, "Unparseable note deadline, applying fallback");
            match policy.invalid_deadline {
                InvalidDeadline::NoDeadline => UrgencyBucket::NoDeadline,
                InvalidDeadline::Overdue => UrgencyBucket::Overdue,
            }
        }
    }
}

pub fn importance_score(importance: Option<Importance>) -> u8 {
    match importance {
        Some(Importance::High) => 3,
        Some(Importance::Medium) => 2,
        Some(Importance::Low) => 1,
        None => 0,
    }
}

/// Sort key for one note. Derived `Ord` compares the fields in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RankKey {
    pub bucket: UrgencyBucket,
    pub importance: Reverse<u8>,
    pub created_at: DateTime<Utc>,
}

pub fn rank_key<T: Rankable>(note: &T, clock: &RankClock, policy: &RankingPolicy) -> RankKey {
    RankKey {
        bucket: urgency_bucket(note.deadline(), clock, policy),
        importance: Reverse(importance_score(note.importance())),
        created_at: note.created_at().unwrap_or(DateTime::<Utc>::MIN_UTC),
    }
}

/// Reorders `notes` by priority. Consumes the input; the returned vector is
/// the only valid ordering afterwards.
pub fn rank<T: Rankable>(mut notes: Vec<T>, clock: &RankClock, policy: &RankingPolicy) -> Vec<T> {
    // stable, and computes each key once
    notes.sort_by_cached_key(|note| rank_key(note, clock, policy));
    notes
}
