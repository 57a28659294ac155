//! Console report formatting

use crate::alignment::AlignmentTimeline;
use crate::batch::RunStats;
use crate::matching::engine::MatchStatistics;
use crate::matching::{GapReport, MatchResult};
use crate::store::MatchStoreStats;
use colored::Colorize;
use std::fmt::Write;

/// Color a 0-1 score by band: green from 0.7, yellow from 0.4, red below
fn colored_score(score: f32) -> colored::ColoredString {
    let text = format!("{:.1}%", score * 100.0);
    if score >= 0.7 {
        text.green().bold()
    } else if score >= 0.4 {
        text.yellow()
    } else {
        text.red()
    }
}

pub fn format_matches(matches: &[MatchResult], detailed: bool) -> String {
    let mut out = String::new();
    if matches.is_empty() {
        let _ = writeln!(out, "{}", "No matches found.".dimmed());
        return out;
    }

    let _ = writeln!(out, "{} ({} found)\n", "Job Matches".bold(), matches.len());
    for (i, m) in matches.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} at {} [{}]",
            i + 1,
            m.job.title.bold(),
            m.job.company,
            colored_score(m.scores.overall)
        );
        let _ = writeln!(
            out,
            "   {} | coverage {:.0}% | {} of {} skills matched",
            m.job.location,
            m.skill_coverage * 100.0,
            m.matching_skills.len(),
            m.total_job_skills
        );
        if detailed {
            if !m.matching_skills.is_empty() {
                let _ = writeln!(out, "   matching: {}", m.matching_skills.join(", ").green());
            }
            if !m.missing_skills.is_empty() {
                let _ = writeln!(out, "   missing:  {}", m.missing_skills.join(", ").red());
            }
            let _ = writeln!(
                out,
                "   jaccard {:.3} | cosine {:.3} | weighted {:.3} ({})",
                m.scores.jaccard, m.scores.cosine, m.scores.weighted, m.algorithm_version
            );
        }
    }
    out
}

pub fn format_gap_report(report: &GapReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} for job {}\n",
        "Skill Gap Analysis".bold(),
        report.job_id
    );
    let _ = writeln!(
        out,
        "Overall: {} | Coverage: {:.0}%",
        colored_score(report.scores.overall),
        report.coverage * 100.0
    );
    let _ = writeln!(
        out,
        "Gaps: {} ({} high, {} medium, {} low)\n",
        report.total_gaps,
        report.high_priority_gaps.to_string().red(),
        report.medium_priority_gaps.to_string().yellow(),
        report.low_priority_gaps
    );

    if !report.matching_skills.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            "Matching:".green().bold(),
            report.matching_skills.join(", ")
        );
    }
    for (class, gaps) in &report.gaps_by_class {
        let _ = writeln!(out, "\n{}:", class.to_string().bold());
        for gap in gaps {
            let _ = writeln!(
                out,
                "  - {} (importance {:.2}, {:?} priority, ~{}h to learn)",
                gap.skill_id, gap.importance, gap.priority, gap.estimated_learning_time_hours
            );
        }
    }
    out
}

pub fn format_run_stats(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Batch Recompute".bold());
    let _ = writeln!(
        out,
        "  processed {}/{} users ({} failed)",
        stats.processed.to_string().green(),
        stats.total_users,
        if stats.failed > 0 {
            stats.failed.to_string().red()
        } else {
            "0".normal()
        }
    );
    let _ = writeln!(
        out,
        "  {} matches saved in {:.2?} ({})",
        stats.total_matches, stats.duration, stats.algorithm
    );
    out
}

pub fn format_timeline(timeline: &AlignmentTimeline) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (last {} days)\n",
        "Alignment Timeline".bold(),
        timeline.days_back
    );
    if timeline.points.is_empty() {
        let _ = writeln!(out, "{}", "No alignment history in this window.".dimmed());
        return out;
    }
    let _ = writeln!(out, "Tracking: {}\n", timeline.industries.join(", "));
    for point in &timeline.points {
        let _ = writeln!(out, "{}", point.date.to_string().bold());
        for (industry, value) in &point.industries {
            let _ = writeln!(
                out,
                "  {} {} (coverage {:.0}%)",
                industry,
                colored_score(value.score),
                value.coverage * 100.0
            );
        }
    }
    out
}

pub fn format_statistics(user: &MatchStatistics, store: &MatchStoreStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Match Statistics".bold());
    let _ = writeln!(out, "  user matches:  {}", user.total_matches);
    let _ = writeln!(
        out,
        "  average score: {} | best: {}",
        colored_score(user.average_similarity),
        colored_score(user.best_match_score)
    );
    let _ = writeln!(
        out,
        "  bands: {} high / {} medium / {} low",
        user.high_matches.to_string().green(),
        user.medium_matches.to_string().yellow(),
        user.low_matches.to_string().red()
    );
    let _ = writeln!(out, "\n{}", "Store".bold());
    let _ = writeln!(
        out,
        "  {} matches across {} users ({} in last 24h)",
        store.total_matches, store.users_with_matches, store.matches_last_24h
    );
    for (algorithm, count) in &store.by_algorithm {
        let _ = writeln!(out, "  {}: {}", algorithm, count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::similarity::SimilarityScores;
    use crate::matching::JobSummary;
    use chrono::Utc;

    fn sample_match() -> MatchResult {
        MatchResult {
            user_id: "u1".to_string(),
            job_id: "j1".to_string(),
            scores: SimilarityScores {
                jaccard: 0.5,
                cosine: 0.6,
                weighted: 0.7,
                overall: 0.62,
            },
            skill_coverage: 0.66,
            matching_skills: vec!["python".to_string(), "sql".to_string()],
            missing_skills: vec!["aws".to_string()],
            total_job_skills: 3,
            total_user_skills: 5,
            algorithm_version: "v1".to_string(),
            computed_at: Utc::now(),
            job: JobSummary {
                title: "Backend Engineer".to_string(),
                company: "Acme".to_string(),
                location: "Remote".to_string(),
                category: None,
                salary_min: None,
                salary_max: None,
            },
        }
    }

    #[test]
    fn test_match_listing_mentions_jobs_and_skills() {
        let text = format_matches(&[sample_match()], true);
        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("aws"));
        assert!(text.contains("v1"));
    }

    #[test]
    fn test_empty_matches_message() {
        let text = format_matches(&[], false);
        assert!(text.contains("No matches"));
    }
}
