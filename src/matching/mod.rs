//! Job matching: similarity scoring, gap analysis, ranking, and the
//! vector-space alternative

pub mod engine;
pub mod gaps;
pub mod ranker;
pub mod similarity;
pub mod tfidf;

pub use engine::MatchEngine;
pub use gaps::{GapReport, GapSummary, SkillGap};
pub use ranker::rank_matches;
pub use similarity::SimilarityScores;
pub use tfidf::VectorSpace;

use crate::error::{Result, SkillMatcherError};
use crate::normalize::NormalizedSkillSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Matching strategy. Both algorithms produce the same `MatchResult` shape,
/// tagged by `algorithm_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Pairwise multi-metric scoring (Jaccard/cosine/weighted fusion)
    Basic,
    /// Shared TF-IDF vector space over the whole job corpus
    Tfidf,
}

impl Algorithm {
    pub fn version(self) -> &'static str {
        match self {
            Algorithm::Basic => "v1",
            Algorithm::Tfidf => "tfidf_v1",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = SkillMatcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" | "v1" => Ok(Algorithm::Basic),
            "tfidf" | "tfidf_v1" => Ok(Algorithm::Tfidf),
            other => Err(SkillMatcherError::InvalidInput(format!(
                "unknown algorithm: {}",
                other
            ))),
        }
    }
}

/// Job metadata carried through to match responses for display
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSummary {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
}

/// One ranked user-vs-job result. A derived cache: superseded, never
/// updated, when matches are recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub user_id: String,
    pub job_id: String,
    pub scores: SimilarityScores,
    pub skill_coverage: f32,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_job_skills: usize,
    pub total_user_skills: usize,
    pub algorithm_version: String,
    pub computed_at: DateTime<Utc>,
    pub job: JobSummary,
}

/// One job of the comparable corpus: its normalized skill set plus the
/// display pass-through
#[derive(Debug, Clone)]
pub struct CorpusJob {
    pub job_id: String,
    pub summary: JobSummary,
    pub skills: NormalizedSkillSet,
}

/// The active job corpus after normalization. Jobs with fewer than two
/// valid skills are excluded as too noisy to compare against.
#[derive(Debug, Clone, Default)]
pub struct JobCorpus {
    pub jobs: Vec<CorpusJob>,
}

impl JobCorpus {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}
