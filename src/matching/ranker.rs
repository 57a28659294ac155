//! Deterministic total ordering of match candidates
//!
//! The absolute number of matching skills is the primary signal: it avoids
//! rewarding tiny, high-ratio matches over substantive ones. The fused score
//! is only a tiebreaker, followed by job comprehensiveness and reuse of the
//! user's broader skill set. Ascending job id is the final key so the order
//! is a strict total order and reproduces bit-for-bit.

use crate::matching::MatchResult;
use std::cmp::Ordering;

/// Sort candidates into display order (best first)
pub fn rank_matches(matches: &mut [MatchResult]) {
    matches.sort_by(compare);
}

fn compare(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.matching_skills
        .len()
        .cmp(&a.matching_skills.len())
        .then_with(|| b.scores.overall.total_cmp(&a.scores.overall))
        .then_with(|| b.total_job_skills.cmp(&a.total_job_skills))
        .then_with(|| a.total_user_skills.cmp(&b.total_user_skills))
        .then_with(|| a.job_id.cmp(&b.job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::similarity::SimilarityScores;
    use crate::matching::{JobSummary, MatchResult};
    use chrono::Utc;

    fn candidate(job_id: &str, matching: usize, overall: f32, job_skills: usize, user_skills: usize) -> MatchResult {
        MatchResult {
            user_id: "u1".to_string(),
            job_id: job_id.to_string(),
            scores: SimilarityScores {
                jaccard: 0.0,
                cosine: 0.0,
                weighted: 0.0,
                overall,
            },
            skill_coverage: 0.0,
            matching_skills: (0..matching).map(|i| format!("s{}", i)).collect(),
            missing_skills: Vec::new(),
            total_job_skills: job_skills,
            total_user_skills: user_skills,
            algorithm_version: "v1".to_string(),
            computed_at: Utc::now(),
            job: JobSummary::default(),
        }
    }

    #[test]
    fn test_matching_count_beats_score() {
        let mut matches = vec![
            candidate("a", 2, 0.9, 5, 10),
            candidate("b", 3, 0.5, 5, 10),
        ];
        rank_matches(&mut matches);
        assert_eq!(matches[0].job_id, "b");
    }

    #[test]
    fn test_score_breaks_count_ties() {
        let mut matches = vec![
            candidate("a", 3, 0.5, 5, 10),
            candidate("b", 3, 0.9, 5, 10),
        ];
        rank_matches(&mut matches);
        assert_eq!(matches[0].job_id, "b");
    }

    #[test]
    fn test_job_comprehensiveness_then_user_breadth() {
        let mut matches = vec![
            candidate("a", 3, 0.5, 4, 10),
            candidate("b", 3, 0.5, 6, 10),
        ];
        rank_matches(&mut matches);
        assert_eq!(matches[0].job_id, "b");

        // Fewer total user skills ranks first when everything else ties
        let mut matches = vec![
            candidate("a", 3, 0.5, 5, 12),
            candidate("b", 3, 0.5, 5, 8),
        ];
        rank_matches(&mut matches);
        assert_eq!(matches[0].job_id, "b");
    }

    #[test]
    fn test_strict_total_order_via_job_id() {
        let mut matches = vec![
            candidate("b", 3, 0.5, 5, 10),
            candidate("a", 3, 0.5, 5, 10),
        ];
        rank_matches(&mut matches);
        assert_eq!(matches[0].job_id, "a");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let build = || {
            vec![
                candidate("c", 2, 0.7, 5, 10),
                candidate("a", 3, 0.5, 5, 10),
                candidate("b", 3, 0.5, 6, 10),
                candidate("d", 1, 0.99, 2, 10),
            ]
        };
        let mut first = build();
        let mut second = build();
        rank_matches(&mut first);
        rank_matches(&mut second);
        let order: Vec<&str> = first.iter().map(|m| m.job_id.as_str()).collect();
        let order2: Vec<&str> = second.iter().map(|m| m.job_id.as_str()).collect();
        assert_eq!(order, order2);
        assert_eq!(order, vec!["b", "a", "c", "d"]);
    }
}
