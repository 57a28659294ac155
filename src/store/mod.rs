//! Storage seam: repository traits and the typed records they exchange
//!
//! The engine only sees these traits. Matches and their gaps are a derived
//! cache the engine fully owns and regenerates; skill assertions, job
//! postings, and industry profiles are read-only upstream inputs.

pub mod memory;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::matching::gaps::SkillGap;
use crate::matching::{JobSummary, MatchResult};
use crate::normalize::SkillAssertion;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A job posting with its extracted skill requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub skills: Vec<SkillAssertion>,
}

fn default_true() -> bool {
    true
}

impl JobPosting {
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
        }
    }
}

/// One skill of an industry's demand profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustrySkill {
    pub display_name: String,
    pub importance: f32,
}

/// An industry's aggregate skill-importance profile, derived externally
/// from job-skill co-occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub industry: String,
    pub skills: BTreeMap<String, IndustrySkill>,
}

/// One persisted alignment measurement for a (user, industry) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryAlignment {
    pub user_id: String,
    pub industry_category: String,
    pub alignment_score: f32,
    pub matched_skill_ids: Vec<String>,
    pub missing_skill_ids: Vec<String>,
    pub skill_coverage: f32,
    pub total_industry_skills: usize,
    pub skill_count_at_calculation: usize,
    pub calculated_at: DateTime<Utc>,
}

/// Per-user periodic rollup used to reconstruct a timeline without
/// re-scanning full history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentSnapshot {
    pub user_id: String,
    pub total_skills: usize,
    pub technical_skills: usize,
    pub soft_skills: usize,
    pub top_industry_alignments: BTreeMap<String, f32>,
    pub trigger_event: String,
    pub calculated_at: DateTime<Utc>,
}

/// Aggregate view of the stored match cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStoreStats {
    pub total_matches: usize,
    pub users_with_matches: usize,
    pub matches_last_24h: usize,
    pub by_algorithm: BTreeMap<String, usize>,
}

/// Read access to skill assertions, produced by the extraction subsystem
#[async_trait]
pub trait SkillStore: Send + Sync {
    async fn user_ids_with_skills(&self) -> Result<Vec<String>>;
    async fn user_skills(&self, user_id: &str) -> Result<Vec<SkillAssertion>>;
}

/// Read access to the active job corpus
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn active_jobs(&self) -> Result<Vec<JobPosting>>;
    async fn job(&self, job_id: &str) -> Result<Option<JobPosting>>;
}

/// Ownership of the derived match cache. Replacement is atomic per user:
/// readers never observe a window with zero matches mid-recompute.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Delete the user's prior matches (cascading to their gaps) and insert
    /// the new set in one step. Returns the number of matches saved.
    async fn replace_matches(
        &self,
        user_id: &str,
        matches: Vec<(MatchResult, Vec<SkillGap>)>,
    ) -> Result<usize>;

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<MatchResult>>;

    /// Age-based cleanup, independent of recompute
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn statistics(&self) -> Result<MatchStoreStats>;
}

/// Ownership of the alignment time series
#[async_trait]
pub trait AlignmentStore: Send + Sync {
    /// Append an alignment row, or update in place when a row for the same
    /// (user, industry) was calculated within the idempotency window
    async fn save_alignment(
        &self,
        alignment: IndustryAlignment,
        idempotency_window: Duration,
    ) -> Result<()>;

    async fn alignments_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<IndustryAlignment>>;

    async fn insert_snapshot(&self, snapshot: AlignmentSnapshot) -> Result<()>;

    async fn snapshots_for_user(&self, user_id: &str) -> Result<Vec<AlignmentSnapshot>>;
}

/// Supplier of industry skill-demand profiles, computed externally
#[async_trait]
pub trait IndustryProfileSource: Send + Sync {
    async fn industry_profiles(&self) -> Result<Vec<IndustryProfile>>;
}
