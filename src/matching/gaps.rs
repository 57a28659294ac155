//! Skill gap analysis: matched/missing breakdown, coverage, and
//! prioritized learning estimates

use crate::matching::similarity::{calculate_similarity, SimilarityScores};
use crate::normalize::NormalizedSkillSet;
use crate::vocabulary::{SkillClass, SkillVocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proficiency assumed sufficient to close a gap
pub const REQUIRED_PROFICIENCY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Missing,
    LowProficiency,
    Outdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority ladder over job-side importance
    pub fn from_importance(importance: f32) -> Self {
        if importance >= 1.0 {
            Priority::High
        } else if importance >= 0.7 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// One missing (or weak) skill relative to a job's requirements.
/// Owned by exactly one stored match; cascade-deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_id: String,
    pub gap_type: GapType,
    pub importance: f32,
    pub user_proficiency: f32,
    pub required_proficiency: f32,
    pub priority: Priority,
    pub skill_class: SkillClass,
    pub estimated_learning_time_hours: u32,
}

/// Set-level view of a user-vs-job comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapSummary {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub coverage: f32,
    pub total_required: usize,
    pub total_matching: usize,
    pub total_missing: usize,
}

/// On-demand gap report for one (user, job) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub user_id: String,
    pub job_id: String,
    pub scores: SimilarityScores,
    pub coverage: f32,
    pub matching_skills: Vec<String>,
    pub gaps_by_class: BTreeMap<SkillClass, Vec<SkillGap>>,
    pub total_gaps: usize,
    pub high_priority_gaps: usize,
    pub medium_priority_gaps: usize,
    pub low_priority_gaps: usize,
}

/// Compute matched/missing skill lists and coverage.
/// Coverage is |matched| / |job skills|, 0 for an empty job set.
pub fn analyze_skill_gaps(user: &NormalizedSkillSet, job: &NormalizedSkillSet) -> GapSummary {
    let matching_skills: Vec<String> = job
        .skill_ids()
        .filter(|id| user.contains(id))
        .cloned()
        .collect();
    let missing_skills: Vec<String> = job
        .skill_ids()
        .filter(|id| !user.contains(id))
        .cloned()
        .collect();

    let coverage = if job.is_empty() {
        0.0
    } else {
        matching_skills.len() as f32 / job.len() as f32
    };

    GapSummary {
        total_required: job.len(),
        total_matching: matching_skills.len(),
        total_missing: missing_skills.len(),
        matching_skills,
        missing_skills,
        coverage,
    }
}

/// Build prioritized gap records for the missing skills of a comparison
pub fn build_skill_gaps(
    job: &NormalizedSkillSet,
    missing_skills: &[String],
    vocabulary: &SkillVocabulary,
) -> Vec<SkillGap> {
    missing_skills
        .iter()
        .map(|skill_id| {
            let importance = job.weight(skill_id);
            let skill_class = vocabulary.classify(skill_id);
            SkillGap {
                skill_id: skill_id.clone(),
                gap_type: GapType::Missing,
                importance,
                user_proficiency: 0.0,
                required_proficiency: REQUIRED_PROFICIENCY,
                priority: Priority::from_importance(importance),
                skill_class,
                estimated_learning_time_hours: skill_class.estimated_learning_hours(),
            }
        })
        .collect()
}

/// Full on-demand gap report: similarity, coverage, and gaps grouped by
/// derived skill class
pub fn build_gap_report(
    user_id: &str,
    job_id: &str,
    user: &NormalizedSkillSet,
    job: &NormalizedSkillSet,
    vocabulary: &SkillVocabulary,
) -> GapReport {
    let scores = calculate_similarity(user, job, vocabulary);
    let summary = analyze_skill_gaps(user, job);
    let gaps = build_skill_gaps(job, &summary.missing_skills, vocabulary);

    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;
    let mut gaps_by_class: BTreeMap<SkillClass, Vec<SkillGap>> = BTreeMap::new();
    for gap in gaps {
        match gap.priority {
            Priority::High => high += 1,
            Priority::Medium => medium += 1,
            Priority::Low => low += 1,
        }
        gaps_by_class.entry(gap.skill_class).or_default().push(gap);
    }

    GapReport {
        user_id: user_id.to_string(),
        job_id: job_id.to_string(),
        scores,
        coverage: summary.coverage,
        matching_skills: summary.matching_skills,
        total_gaps: summary.total_missing,
        high_priority_gaps: high,
        medium_priority_gaps: medium,
        low_priority_gaps: low,
        gaps_by_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Side, SkillAssertion, SkillNormalizer};

    fn normalized(skills: &[(&str, f32)], side: Side) -> NormalizedSkillSet {
        let vocab = SkillVocabulary::new().unwrap();
        let assertions: Vec<SkillAssertion> = skills
            .iter()
            .map(|(name, w)| SkillAssertion::new(name, *w))
            .collect();
        SkillNormalizer::new(&vocab).normalize(&assertions, side)
    }

    #[test]
    fn test_coverage_scenario() {
        // user = {python 0.8, sql 0.6}, job = {python 1.0, sql 1.0, aws 1.0}
        let user = normalized(&[("python", 0.8), ("sql", 0.6)], Side::User);
        let job = normalized(&[("python", 1.0), ("sql", 1.0), ("aws", 1.0)], Side::Job);

        let summary = analyze_skill_gaps(&user, &job);
        assert!((summary.coverage - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(summary.missing_skills, vec!["aws".to_string()]);

        let vocab = SkillVocabulary::new().unwrap();
        let gaps = build_skill_gaps(&job, &summary.missing_skills, &vocab);
        assert_eq!(gaps.len(), 1);
        // job-side importance 1.0 was boosted to 1.3 (aws is technical)
        assert_eq!(gaps[0].priority, Priority::High);
        assert_eq!(gaps[0].gap_type, GapType::Missing);
        assert!((gaps[0].required_proficiency - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_coverage_bounds() {
        let user = normalized(&[("python", 0.8)], Side::User);
        let job = normalized(&[("python", 1.0)], Side::Job);
        let full = analyze_skill_gaps(&user, &job);
        assert!((full.coverage - 1.0).abs() < 1e-6);

        let empty_job = NormalizedSkillSet::default();
        let none = analyze_skill_gaps(&user, &empty_job);
        assert_eq!(none.coverage, 0.0);
    }

    #[test]
    fn test_priority_ladder() {
        assert_eq!(Priority::from_importance(1.5), Priority::High);
        assert_eq!(Priority::from_importance(1.0), Priority::High);
        assert_eq!(Priority::from_importance(0.7), Priority::Medium);
        assert_eq!(Priority::from_importance(0.69), Priority::Low);
    }

    #[test]
    fn test_report_groups_by_class_and_counts_priorities() {
        let vocab = SkillVocabulary::new().unwrap();
        let user = normalized(&[("python", 0.8), ("docker", 0.9)], Side::User);
        let job = normalized(
            &[("python", 1.0), ("docker", 1.0), ("react", 1.0), ("mentoring", 0.4)],
            Side::Job,
        );
        let report = build_gap_report("u1", "j1", &user, &job, &vocab);

        assert_eq!(report.total_gaps, 2);
        assert_eq!(report.high_priority_gaps, 1); // react boosted past 1.0
        assert_eq!(report.low_priority_gaps, 1); // mentoring at 0.4
        assert!(report.gaps_by_class.contains_key(&SkillClass::Framework));
        assert!(report.gaps_by_class.contains_key(&SkillClass::SoftSkill));
        assert_eq!(report.matching_skills.len(), 2);
    }

    #[test]
    fn test_learning_time_lookup() {
        let vocab = SkillVocabulary::new().unwrap();
        let job = normalized(
            &[("python", 1.0), ("react", 1.0), ("sql", 1.0), ("mentoring", 1.0)],
            Side::Job,
        );
        let missing: Vec<String> = job.skill_ids().cloned().collect();
        let gaps = build_skill_gaps(&job, &missing, &vocab);
        let hours: BTreeMap<&str, u32> = gaps
            .iter()
            .map(|g| (g.skill_id.as_str(), g.estimated_learning_time_hours))
            .collect();
        assert_eq!(hours["python"], 80);
        assert_eq!(hours["react"], 40);
        assert_eq!(hours["sql"], 20);
        assert_eq!(hours["mentoring"], 15);
    }
}
