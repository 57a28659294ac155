//! In-memory reference store: match arena with per-user and per-match
//! indexes, explicit gap cascade, and JSON corpus loading
//!
//! Gaps are keyed by match id in their own index; deleting a match goes
//! through `delete_user_matches` so the cascade is enforced in code, not by
//! a storage layer. All mutation for one user's replace happens under a
//! single write lock, making delete-then-insert atomic.

use crate::error::{Result, SkillMatcherError};
use crate::matching::gaps::SkillGap;
use crate::matching::MatchResult;
use crate::normalize::SkillAssertion;
use crate::store::{
    AlignmentSnapshot, AlignmentStore, IndustryAlignment, IndustryProfile, IndustryProfileSource,
    JobPosting, JobStore, MatchStore, MatchStoreStats, SkillStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;

/// On-disk corpus format consumed by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
    #[serde(default)]
    pub industries: Vec<IndustryProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub skills: Vec<SkillAssertion>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, Vec<SkillAssertion>>,
    jobs: Vec<JobPosting>,
    industries: Vec<IndustryProfile>,

    // Match arena + indexes
    next_match_id: u64,
    matches: HashMap<u64, MatchResult>,
    matches_by_user: HashMap<String, Vec<u64>>,
    gaps_by_match: HashMap<u64, Vec<SkillGap>>,

    alignments: Vec<IndustryAlignment>,
    snapshots: Vec<AlignmentSnapshot>,

    // Users whose skill reads fail, for batch fault-isolation tests
    failing_users: HashSet<String>,
}

impl Inner {
    /// Explicit delete cascade: removing a user's matches also removes
    /// every gap owned by those matches
    fn delete_user_matches(&mut self, user_id: &str) -> usize {
        let ids = self.matches_by_user.remove(user_id).unwrap_or_default();
        for id in &ids {
            self.matches.remove(id);
            self.gaps_by_match.remove(id);
        }
        ids.len()
    }
}

pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn from_corpus(corpus: CorpusFile) -> Self {
        let mut inner = Inner::default();
        for user in corpus.users {
            inner.users.insert(user.id, user.skills);
        }
        inner.jobs = corpus.jobs;
        inner.industries = corpus.industries;
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Load a JSON corpus file (users, jobs, industry profiles)
    pub fn load_corpus_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let corpus: CorpusFile = serde_json::from_str(&content)?;
        log::info!(
            "loaded corpus: {} users, {} jobs, {} industries",
            corpus.users.len(),
            corpus.jobs.len(),
            corpus.industries.len()
        );
        Ok(Self::from_corpus(corpus))
    }

    pub async fn insert_user(&self, user_id: &str, skills: Vec<SkillAssertion>) {
        self.inner
            .write()
            .await
            .users
            .insert(user_id.to_string(), skills);
    }

    pub async fn insert_job(&self, job: JobPosting) {
        self.inner.write().await.jobs.push(job);
    }

    pub async fn insert_industry(&self, profile: IndustryProfile) {
        self.inner.write().await.industries.push(profile);
    }

    /// Make subsequent skill reads for this user fail (test support for
    /// batch fault isolation)
    pub async fn fail_user(&self, user_id: &str) {
        self.inner
            .write()
            .await
            .failing_users
            .insert(user_id.to_string());
    }

    /// Total stored gap records, across all matches
    pub async fn gap_count(&self) -> usize {
        self.inner
            .read()
            .await
            .gaps_by_match
            .values()
            .map(|g| g.len())
            .sum()
    }

    pub async fn gaps_for_user(&self, user_id: &str) -> Vec<SkillGap> {
        let inner = self.inner.read().await;
        let mut gaps = Vec::new();
        if let Some(ids) = inner.matches_by_user.get(user_id) {
            for id in ids {
                if let Some(match_gaps) = inner.gaps_by_match.get(id) {
                    gaps.extend(match_gaps.iter().cloned());
                }
            }
        }
        gaps
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SkillStore for InMemoryStore {
    async fn user_ids_with_skills(&self) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        let mut ids: Vec<String> = inner
            .users
            .iter()
            .filter(|(_, skills)| !skills.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn user_skills(&self, user_id: &str) -> Result<Vec<SkillAssertion>> {
        let inner = self.inner.read().await;
        if inner.failing_users.contains(user_id) {
            return Err(SkillMatcherError::Store(format!(
                "skill read failed for user {}",
                user_id
            )));
        }
        inner
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| SkillMatcherError::UnknownUser(user_id.to_string()))
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn active_jobs(&self) -> Result<Vec<JobPosting>> {
        let inner = self.inner.read().await;
        Ok(inner.jobs.iter().filter(|j| j.is_active).cloned().collect())
    }

    async fn job(&self, job_id: &str) -> Result<Option<JobPosting>> {
        let inner = self.inner.read().await;
        Ok(inner.jobs.iter().find(|j| j.id == job_id).cloned())
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn replace_matches(
        &self,
        user_id: &str,
        matches: Vec<(MatchResult, Vec<SkillGap>)>,
    ) -> Result<usize> {
        let mut inner = self.inner.write().await;

        let deleted = inner.delete_user_matches(user_id);
        log::debug!("superseded {} matches for user {}", deleted, user_id);

        let mut ids = Vec::with_capacity(matches.len());
        for (result, gaps) in matches {
            let id = inner.next_match_id;
            inner.next_match_id += 1;
            inner.matches.insert(id, result);
            inner.gaps_by_match.insert(id, gaps);
            ids.push(id);
        }
        let saved = ids.len();
        inner.matches_by_user.insert(user_id.to_string(), ids);
        Ok(saved)
    }

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<MatchResult>> {
        let inner = self.inner.read().await;
        let mut results = Vec::new();
        if let Some(ids) = inner.matches_by_user.get(user_id) {
            for id in ids {
                if let Some(result) = inner.matches.get(id) {
                    results.push(result.clone());
                }
            }
        }
        Ok(results)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let stale: Vec<u64> = inner
            .matches
            .iter()
            .filter(|(_, m)| m.computed_at < cutoff)
            .map(|(&id, _)| id)
            .collect();
        for id in &stale {
            if let Some(result) = inner.matches.remove(id) {
                inner.gaps_by_match.remove(id);
                if let Some(ids) = inner.matches_by_user.get_mut(&result.user_id) {
                    ids.retain(|i| i != id);
                }
            }
        }
        Ok(stale.len())
    }

    async fn statistics(&self) -> Result<MatchStoreStats> {
        let inner = self.inner.read().await;
        let day_ago = Utc::now() - Duration::hours(24);
        let mut by_algorithm: BTreeMap<String, usize> = BTreeMap::new();
        let mut matches_last_24h = 0;
        for result in inner.matches.values() {
            *by_algorithm
                .entry(result.algorithm_version.clone())
                .or_insert(0) += 1;
            if result.computed_at >= day_ago {
                matches_last_24h += 1;
            }
        }
        Ok(MatchStoreStats {
            total_matches: inner.matches.len(),
            users_with_matches: inner
                .matches_by_user
                .values()
                .filter(|ids| !ids.is_empty())
                .count(),
            matches_last_24h,
            by_algorithm,
        })
    }
}

#[async_trait]
impl AlignmentStore for InMemoryStore {
    async fn save_alignment(
        &self,
        alignment: IndustryAlignment,
        idempotency_window: Duration,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let window_start = alignment.calculated_at - idempotency_window;

        // Update in place when a row for the same pair falls inside the
        // window; rapid successive events must not pile up snapshots
        let existing = inner.alignments.iter_mut().find(|row| {
            row.user_id == alignment.user_id
                && row.industry_category == alignment.industry_category
                && row.calculated_at >= window_start
        });
        match existing {
            Some(row) => *row = alignment,
            None => inner.alignments.push(alignment),
        }
        Ok(())
    }

    async fn alignments_since(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<IndustryAlignment>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<IndustryAlignment> = inner
            .alignments
            .iter()
            .filter(|row| row.user_id == user_id && row.calculated_at >= cutoff)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.calculated_at);
        Ok(rows)
    }

    async fn insert_snapshot(&self, snapshot: AlignmentSnapshot) -> Result<()> {
        self.inner.write().await.snapshots.push(snapshot);
        Ok(())
    }

    async fn snapshots_for_user(&self, user_id: &str) -> Result<Vec<AlignmentSnapshot>> {
        let inner = self.inner.read().await;
        Ok(inner
            .snapshots
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IndustryProfileSource for InMemoryStore {
    async fn industry_profiles(&self) -> Result<Vec<IndustryProfile>> {
        Ok(self.inner.read().await.industries.clone())
    }
}
