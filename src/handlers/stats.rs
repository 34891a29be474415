use std::time::Instant;

use axum::{extract::State, Extension, Json};
use chrono::{FixedOffset, Offset, Utc};

use super::elapsed_ms;
use crate::auth::middleware::AuthUser;
use crate::dto::{MoodStatsResponse, StatsQuery};
use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::query::{MoodListParams, MoodQuery};
use crate::stats::aggregate;
use crate::AppState;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Malformed offsets fall back to UTC; out-of-range ones are clamped.
fn parse_offset(raw: Option<&str>) -> FixedOffset {
    let minutes = raw
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(0)
        .clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Aggregates the whole filtered set, not just one page of it.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<StatsQuery>,
) -> AppResult<Json<MoodStatsResponse>> {
    let started = Instant::now();
    let offset = parse_offset(params.tz_offset_minutes.as_deref());

    let filter = MoodQuery::build(
        auth_user.id,
        &MoodListParams {
            search: params.search,
            from: params.from,
            to: params.to,
            ..Default::default()
        },
    )
    .filter;

    // One extra row tells us whether the cap cut anything off.
    let cap = state.config.stats_max_entries.max(1);
    let mut entries = state
        .moods
        .find_moods(&MoodQuery::unpaged(filter, cap.saturating_add(1)))
        .await?;
    let truncated = entries.len() > cap as usize;
    entries.truncate(cap as usize);

    let stats = aggregate(&entries, offset);

    tracing::info!(
        user_id = %auth_user.id,
        entries = entries.len(),
        truncated,
        duration_ms = elapsed_ms(started),
        "Mood stats computed"
    );

    Ok(Json(MoodStatsResponse { stats, truncated }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None).local_minus_utc(), 0);
        assert_eq!(parse_offset(Some("120")).local_minus_utc(), 7200);
        assert_eq!(parse_offset(Some(" -300 ")).local_minus_utc(), -18000);
        assert_eq!(parse_offset(Some("abc")).local_minus_utc(), 0);
        assert_eq!(parse_offset(Some("100000")).local_minus_utc(), 14 * 3600);
    }
}
