//! Response shapes that are not plain models.

use serde::{Deserialize, Serialize};

use crate::stats::MoodStats;

/// Standard success message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /api/moods/stats
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Minutes east of UTC used for weekday and month bucketing.
    pub tz_offset_minutes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodStatsResponse {
    #[serde(flatten)]
    pub stats: MoodStats,
    /// Set when the filtered set was larger than the aggregation cap.
    pub truncated: bool,
}
