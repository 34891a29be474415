//! Translates untrusted list parameters into a storage query.
//!
//! Building never fails: every malformed knob collapses to its default, and a
//! malformed date becomes a bound that matches nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mood::MoodEntry;

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_PAGE: u32 = 1;
pub const MAX_LIMIT: u32 = 1000;

/// Raw list parameters as received from the client.
///
/// This is also the journal view state: a client round-trips it to move
/// between pages or change filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl MoodListParams {
    /// Same filters, but back on the first page.
    pub fn first_page(&self) -> Self {
        Self {
            page: None,
            ..self.clone()
        }
    }

    /// Same filters, one page further.
    pub fn next_page(&self) -> Self {
        let page = parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        Self {
            page: Some(page.saturating_add(1).to_string()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One end of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    At(DateTime<Utc>),
    /// The client sent something unparseable. Matches no entry.
    Invalid,
}

impl DateBound {
    pub fn parse(raw: &str) -> Self {
        parse_date(raw).map_or(DateBound::Invalid, DateBound::At)
    }
}

/// Conjunction of owner, date range and free-text predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodFilter {
    pub owner_id: Uuid,
    pub from: Option<DateBound>,
    pub to: Option<DateBound>,
    /// Trimmed, non-empty search term.
    pub search: Option<String>,
}

impl MoodFilter {
    pub fn owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            from: None,
            to: None,
            search: None,
        }
    }

    /// True when at least one bound can never be satisfied.
    pub fn has_invalid_bound(&self) -> bool {
        matches!(self.from, Some(DateBound::Invalid))
            || matches!(self.to, Some(DateBound::Invalid))
    }

    pub fn matches(&self, entry: &MoodEntry) -> bool {
        if entry.owner_id != self.owner_id {
            return false;
        }
        match self.from {
            Some(DateBound::At(from)) if entry.created_at < from => return false,
            Some(DateBound::Invalid) => return false,
            _ => {}
        }
        match self.to {
            Some(DateBound::At(to)) if entry.created_at > to => return false,
            Some(DateBound::Invalid) => return false,
            _ => {}
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                entry.note.to_lowercase().contains(&term)
                    || entry.category.label().to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// Everything the store needs to answer a list request.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodQuery {
    pub filter: MoodFilter,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    pub offset: u64,
    pub limit: u32,
}

impl MoodQuery {
    /// Build the list query for `owner_id`. The owner never comes from `params`.
    pub fn build(owner_id: Uuid, params: &MoodListParams) -> Self {
        let filter = MoodFilter {
            owner_id,
            from: non_blank(params.from.as_deref()).map(DateBound::parse),
            to: non_blank(params.to.as_deref()).map(DateBound::parse),
            search: non_blank(params.search.as_deref()).map(str::to_string),
        };

        let (sort_key, direction) = parse_sort(params.sort.as_deref());
        let limit = parse_positive(params.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let page = parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let offset = u64::from(page - 1) * u64::from(limit);

        Self {
            filter,
            sort_key,
            direction,
            offset,
            limit,
        }
    }

    /// Unpaginated newest-first query over `filter`, capped at `cap` rows.
    pub fn unpaged(filter: MoodFilter, cap: u32) -> Self {
        Self {
            filter,
            sort_key: SortKey::CreatedAt,
            direction: SortDirection::Desc,
            offset: 0,
            limit: cap.max(1),
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_sort(raw: Option<&str>) -> (SortKey, SortDirection) {
    match raw.map(str::trim) {
        Some("date_asc") => (SortKey::CreatedAt, SortDirection::Asc),
        Some("date_desc") => (SortKey::CreatedAt, SortDirection::Desc),
        Some("mood_asc" | "category_asc") => (SortKey::Category, SortDirection::Asc),
        Some("mood_desc" | "category_desc") => (SortKey::Category, SortDirection::Desc),
        _ => (SortKey::CreatedAt, SortDirection::Desc),
    }
}

/// Reads leading decimal digits, ignoring surrounding whitespace.
/// Zero, negatives and non-numeric input yield `None`.
pub fn parse_positive(raw: Option<&str>) -> Option<u32> {
    let s = raw?.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let digits = &s[..end];
    if digits.is_empty() {
        return None;
    }
    // Out-of-range digit runs saturate rather than fall back.
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    (value > 0).then_some(value)
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD`, all read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
