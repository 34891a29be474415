//! Chart-ready aggregates over a set of mood entries.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset};
use serde::Serialize;

use crate::models::mood::{Category, MoodEntry};

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub day: &'static str,
    pub average: f64,
    /// Number of scored entries behind `average`.
    pub entries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub category: Category,
    pub data: Vec<u32>,
}

/// Per-month stacked counts. `datasets[c].data[i]` belongs to `labels[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub datasets: Vec<CategorySeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Highlights {
    NoData,
    Summary {
        most_common: Category,
        most_common_percentage: f64,
        best_day: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodStats {
    pub total: u32,
    pub category_counts: Vec<CategoryCount>,
    pub weekly_averages: Vec<WeekdayAverage>,
    pub monthly: MonthlySeries,
    pub highlights: Highlights,
}

struct MonthBucket {
    label: String,
    counts: [u32; 7],
}

/// Aggregate `entries`, bucketing weekdays and months in `offset`.
pub fn aggregate(entries: &[MoodEntry], offset: FixedOffset) -> MoodStats {
    let mut category_counts: Vec<CategoryCount> = Vec::new();
    let mut score_sums = [0u32; 7];
    let mut score_counts = [0u32; 7];
    let mut months: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();

    for entry in entries {
        match category_counts.iter_mut().find(|c| c.category == entry.category) {
            Some(c) => c.count += 1,
            None => category_counts.push(CategoryCount {
                category: entry.category,
                count: 1,
            }),
        }

        let local = entry.created_at.with_timezone(&offset);
        let day = local.weekday().num_days_from_sunday() as usize;
        score_sums[day] += entry.category.score();
        score_counts[day] += 1;

        let bucket = months
            .entry((local.year(), local.month()))
            .or_insert_with(|| MonthBucket {
                label: local.format("%b %Y").to_string(),
                counts: [0; 7],
            });
        bucket.counts[entry.category as usize] += 1;
    }

    let weekly_averages: Vec<WeekdayAverage> = WEEKDAYS
        .into_iter()
        .enumerate()
        .map(|(i, day)| WeekdayAverage {
            day,
            average: if score_counts[i] > 0 {
                round1(f64::from(score_sums[i]) / f64::from(score_counts[i]))
            } else {
                0.0
            },
            entries: score_counts[i],
        })
        .collect();

    let monthly = MonthlySeries {
        labels: months.values().map(|m| m.label.clone()).collect(),
        datasets: Category::ALL
            .into_iter()
            .map(|category| CategorySeries {
                category,
                data: months
                    .values()
                    .map(|m| m.counts[category as usize])
                    .collect(),
            })
            .collect(),
    };

    let total = u32::try_from(entries.len()).unwrap_or(u32::MAX);
    let highlights = highlights(&category_counts, &weekly_averages, total);

    MoodStats {
        total,
        category_counts,
        weekly_averages,
        monthly,
        highlights,
    }
}

fn highlights(counts: &[CategoryCount], weekly: &[WeekdayAverage], total: u32) -> Highlights {
    if total == 0 {
        return Highlights::NoData;
    }

    // Earlier candidates win ties.
    let Some(top) = counts
        .iter()
        .fold(None::<&CategoryCount>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        })
    else {
        return Highlights::NoData;
    };

    let best_day = weekly
        .iter()
        .fold(None::<&WeekdayAverage>, |best, d| match best {
            Some(b) if b.average >= d.average => Some(b),
            _ => Some(d),
        })
        .map_or(WEEKDAYS[0], |d| d.day);

    Highlights::Summary {
        most_common: top.category,
        most_common_percentage: round1(f64::from(top.count) * 100.0 / f64::from(total)),
        best_day,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn entry(category: Category, y: i32, m: u32, d: u32) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            category,
            note: "n".into(),
            created_at: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            last_edited_at: None,
        }
    }

    #[test]
    fn test_counts_weekday_and_highlights() {
        // 2025-11-02 is a Sunday, 2025-11-03 a Monday.
        let entries = vec![
            entry(Category::Happy, 2025, 11, 2),
            entry(Category::Happy, 2025, 11, 2),
            entry(Category::Sad, 2025, 11, 3),
        ];
        let stats = aggregate(&entries, utc());

        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.category_counts,
            vec![
                CategoryCount {
                    category: Category::Happy,
                    count: 2,
                },
                CategoryCount {
                    category: Category::Sad,
                    count: 1,
                },
            ]
        );
        assert_eq!(stats.weekly_averages[0].day, "Sun");
        assert_eq!(stats.weekly_averages[0].average, 10.0);
        assert_eq!(stats.weekly_averages[0].entries, 2);
        assert_eq!(stats.weekly_averages[1].average, 2.0);
        assert_eq!(stats.weekly_averages[2].average, 0.0);

        assert_eq!(
            stats.highlights,
            Highlights::Summary {
                most_common: Category::Happy,
                most_common_percentage: 66.7,
                best_day: "Sun",
            }
        );
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        // (10 + 9 + 4) / 3 = 7.666..
        let entries = vec![
            entry(Category::Happy, 2025, 11, 4),
            entry(Category::Excited, 2025, 11, 4),
            entry(Category::Tired, 2025, 11, 4),
        ];
        let stats = aggregate(&entries, utc());
        assert_eq!(stats.weekly_averages[2].day, "Tue");
        assert_eq!(stats.weekly_averages[2].average, 7.7);
    }

    #[test]
    fn test_monthly_series_orders_chronologically_across_years() {
        let entries = vec![
            entry(Category::Calm, 2026, 1, 3),
            entry(Category::Happy, 2025, 11, 2),
            entry(Category::Happy, 2025, 10, 5),
            entry(Category::Sad, 2025, 10, 6),
        ];
        let stats = aggregate(&entries, utc());
        assert_eq!(stats.monthly.labels, vec!["Oct 2025", "Nov 2025", "Jan 2026"]);
        assert_eq!(stats.monthly.datasets.len(), 7);

        let series = |c: Category| {
            stats
                .monthly
                .datasets
                .iter()
                .find(|s| s.category == c)
                .unwrap()
                .data
                .clone()
        };
        assert_eq!(series(Category::Happy), vec![1, 1, 0]);
        assert_eq!(series(Category::Sad), vec![1, 0, 0]);
        assert_eq!(series(Category::Calm), vec![0, 0, 1]);
        assert_eq!(series(Category::Tired), vec![0, 0, 0]);
        assert_eq!(stats.monthly.datasets[0].category, Category::Happy);
        assert_eq!(stats.monthly.datasets[6].category, Category::Tired);
    }

    #[test]
    fn test_two_month_example() {
        let entries = vec![
            entry(Category::Excited, 2025, 11, 2),
            entry(Category::Happy, 2025, 10, 5),
        ];
        let stats = aggregate(&entries, utc());
        assert_eq!(stats.monthly.labels, vec!["Oct 2025", "Nov 2025"]);
    }

    #[test]
    fn test_empty_input_reports_no_data() {
        let stats = aggregate(&[], utc());
        assert_eq!(stats.total, 0);
        assert!(stats.category_counts.is_empty());
        assert_eq!(stats.weekly_averages.len(), 7);
        assert!(stats.weekly_averages.iter().all(|d| d.average == 0.0 && d.entries == 0));
        assert!(stats.monthly.labels.is_empty());
        assert!(stats.monthly.datasets.iter().all(|s| s.data.is_empty()));
        assert_eq!(stats.highlights, Highlights::NoData);
    }

    #[test]
    fn test_most_common_tie_keeps_first_encountered() {
        let entries = vec![
            entry(Category::Sad, 2025, 11, 3),
            entry(Category::Happy, 2025, 11, 3),
            entry(Category::Happy, 2025, 11, 4),
            entry(Category::Sad, 2025, 11, 4),
        ];
        let stats = aggregate(&entries, utc());
        match stats.highlights {
            Highlights::Summary { most_common, most_common_percentage, .. } => {
                assert_eq!(most_common, Category::Sad);
                assert_eq!(most_common_percentage, 50.0);
            }
            Highlights::NoData => panic!("expected summary"),
        }
    }

    #[test]
    fn test_best_day_tie_keeps_earliest_weekday() {
        // Monday and Wednesday both average 10.
        let entries = vec![
            entry(Category::Happy, 2025, 11, 5),
            entry(Category::Happy, 2025, 11, 3),
        ];
        let stats = aggregate(&entries, utc());
        match stats.highlights {
            Highlights::Summary { best_day, .. } => assert_eq!(best_day, "Mon"),
            Highlights::NoData => panic!("expected summary"),
        }
    }

    #[test]
    fn test_offset_shifts_weekday_and_month() {
        // 2025-10-31 23:30 UTC is already Saturday Nov 1 at UTC+2.
        let e = MoodEntry {
            created_at: Utc.with_ymd_and_hms(2025, 10, 31, 23, 30, 0).unwrap(),
            ..entry(Category::Calm, 2025, 10, 31)
        };
        let utc_stats = aggregate(std::slice::from_ref(&e), utc());
        assert_eq!(utc_stats.monthly.labels, vec!["Oct 2025"]);
        assert_eq!(utc_stats.weekly_averages[5].entries, 1);

        let shifted = aggregate(&[e], FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(shifted.monthly.labels, vec!["Nov 2025"]);
        assert_eq!(shifted.weekly_averages[6].entries, 1);
    }

    #[test]
    fn test_highlights_serialize_with_status_tag() {
        let json = serde_json::to_value(Highlights::NoData).unwrap();
        assert_eq!(json["status"], "no_data");

        let json = serde_json::to_value(Highlights::Summary {
            most_common: Category::Happy,
            most_common_percentage: 50.0,
            best_day: "Fri",
        })
        .unwrap();
        assert_eq!(json["status"], "summary");
        assert_eq!(json["most_common"], "☀️ Happy");
        assert_eq!(json["best_day"], "Fri");
    }
}
