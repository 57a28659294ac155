//! Day/industry grouping over persisted alignment rows
//!
//! Pure functions over already-fetched rows; the calculator does the store
//! round trips. One point per calendar day, carrying the latest row of that
//! day for each tracked industry.

use crate::store::IndustryAlignment;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How far back to look when picking the currently-relevant industries
const TOP_INDUSTRY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndustryPoint {
    pub score: f32,
    pub coverage: f32,
}

/// One calendar day of the timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub industries: BTreeMap<String, IndustryPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentTimeline {
    pub user_id: String,
    pub days_back: i64,
    pub industries: Vec<String>,
    pub points: Vec<TimelinePoint>,
}

/// Pick the top-N industries by their latest score within the last week.
/// Recent measurements decide what is worth charting, not stale history.
pub fn top_industries(rows: &[IndustryAlignment], now: DateTime<Utc>, top_n: usize) -> Vec<String> {
    let cutoff = now - Duration::days(TOP_INDUSTRY_WINDOW_DAYS);
    let mut latest: BTreeMap<&str, (DateTime<Utc>, f32)> = BTreeMap::new();
    for row in rows {
        if row.calculated_at < cutoff {
            continue;
        }
        match latest.get(row.industry_category.as_str()) {
            Some((at, _)) if *at >= row.calculated_at => {}
            _ => {
                latest.insert(
                    row.industry_category.as_str(),
                    (row.calculated_at, row.alignment_score),
                );
            }
        }
    }

    let mut ranked: Vec<(&str, f32)> = latest
        .into_iter()
        .map(|(industry, (_, score))| (industry, score))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(industry, _)| industry.to_string())
        .collect()
}

/// Group rows into one point per day, keeping the latest row per day per
/// tracked industry
pub fn build_timeline(rows: &[IndustryAlignment], industries: &[String]) -> Vec<TimelinePoint> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<String, (DateTime<Utc>, IndustryPoint)>> =
        BTreeMap::new();

    for row in rows {
        if !industries.contains(&row.industry_category) {
            continue;
        }
        let day = row.calculated_at.date_naive();
        let per_day = days.entry(day).or_default();
        match per_day.get(&row.industry_category) {
            Some((at, _)) if *at >= row.calculated_at => {}
            _ => {
                per_day.insert(
                    row.industry_category.clone(),
                    (
                        row.calculated_at,
                        IndustryPoint {
                            score: row.alignment_score,
                            coverage: row.skill_coverage,
                        },
                    ),
                );
            }
        }
    }

    days.into_iter()
        .map(|(date, per_day)| TimelinePoint {
            date,
            industries: per_day
                .into_iter()
                .map(|(industry, (_, point))| (industry, point))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(industry: &str, score: f32, at: DateTime<Utc>) -> IndustryAlignment {
        IndustryAlignment {
            user_id: "u1".to_string(),
            industry_category: industry.to_string(),
            alignment_score: score,
            matched_skill_ids: Vec::new(),
            missing_skill_ids: Vec::new(),
            skill_coverage: score / 2.0,
            total_industry_skills: 10,
            skill_count_at_calculation: 5,
            calculated_at: at,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_top_industries_use_latest_scores_in_window() {
        let now = at(10, 12);
        let rows = vec![
            // Tech improved recently; the old low score must not count
            row("Technology", 0.2, at(9, 9)),
            row("Technology", 0.8, at(9, 18)),
            row("Finance", 0.5, at(8, 12)),
            // Too old to be considered at all
            row("Healthcare", 0.99, at(1, 12)),
        ];
        let top = top_industries(&rows, now, 2);
        assert_eq!(top, vec!["Technology".to_string(), "Finance".to_string()]);
    }

    #[test]
    fn test_timeline_keeps_latest_row_per_day_per_industry() {
        let industries = vec!["Technology".to_string()];
        let rows = vec![
            row("Technology", 0.3, at(5, 9)),
            row("Technology", 0.6, at(5, 17)),
            row("Technology", 0.7, at(6, 10)),
            // Not tracked, must be dropped
            row("Finance", 0.9, at(5, 12)),
        ];
        let points = build_timeline(&rows, &industries);
        assert_eq!(points.len(), 2);
        assert!((points[0].industries["Technology"].score - 0.6).abs() < 1e-6);
        assert!((points[1].industries["Technology"].score - 0.7).abs() < 1e-6);
        assert!(points[0].date < points[1].date);
    }

    #[test]
    fn test_empty_rows_give_empty_outputs() {
        assert!(top_industries(&[], Utc::now(), 5).is_empty());
        assert!(build_timeline(&[], &["Technology".to_string()]).is_empty());
    }
}
