//! Batch recomputation of the match cache
//!
//! One corpus snapshot per run, shared read-only across a capped pool of
//! per-user tasks. A failing user is counted and skipped; the run always
//! completes.

use crate::config::BatchConfig;
use crate::error::Result;
use crate::matching::engine::{CorpusSnapshot, MatchEngine};
use crate::matching::Algorithm;
use crate::store::{MatchStore, SkillStore};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Outcome of one full recompute run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub total_users: usize,
    pub processed: usize,
    pub failed: usize,
    pub total_matches: usize,
    pub duration: std::time::Duration,
    pub algorithm: String,
}

/// Outcome of a single-user recompute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRunStats {
    pub user_id: String,
    pub matches_saved: usize,
    pub duration: std::time::Duration,
}

pub struct BatchScheduler {
    engine: Arc<MatchEngine>,
    skills: Arc<dyn SkillStore>,
    matches: Arc<dyn MatchStore>,
    config: BatchConfig,
}

impl BatchScheduler {
    pub fn new(
        engine: Arc<MatchEngine>,
        skills: Arc<dyn SkillStore>,
        matches: Arc<dyn MatchStore>,
        config: BatchConfig,
    ) -> Self {
        Self {
            engine,
            skills,
            matches,
            config,
        }
    }

    /// Recompute matches for every user with at least one skill assertion.
    /// `limit_per_user` overrides the configured cap for this run.
    pub async fn recompute_all(
        &self,
        algorithm: Algorithm,
        limit_per_user: Option<usize>,
    ) -> Result<RunStats> {
        let started = Instant::now();
        let limit = limit_per_user.unwrap_or(self.config.limit_per_user);
        let user_ids = self.skills.user_ids_with_skills().await?;
        let snapshot = Arc::new(self.engine.build_corpus_snapshot(algorithm).await?);
        log::info!(
            "batch recompute: {} users, concurrency {}",
            user_ids.len(),
            self.config.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks: JoinSet<(String, Result<usize>)> = JoinSet::new();
        for user_id in &user_ids {
            let engine = self.engine.clone();
            let snapshot = snapshot.clone();
            let semaphore = semaphore.clone();
            let user_id = user_id.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire().await;
                let outcome =
                    recompute_one(&engine, &snapshot, &user_id, limit).await;
                (user_id, outcome)
            });
        }

        let mut stats = RunStats {
            total_users: user_ids.len(),
            processed: 0,
            failed: 0,
            total_matches: 0,
            duration: std::time::Duration::ZERO,
            algorithm: algorithm.version().to_string(),
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(saved))) => {
                    stats.processed += 1;
                    stats.total_matches += saved;
                }
                Ok((user_id, Err(e))) => {
                    stats.failed += 1;
                    log::error!("recompute failed for user {}: {}", user_id, e);
                }
                Err(e) => {
                    stats.failed += 1;
                    log::error!("recompute task panicked: {}", e);
                }
            }
        }

        stats.duration = started.elapsed();
        log::info!(
            "batch recompute done: {}/{} users, {} matches, {} failed, {:?}",
            stats.processed,
            stats.total_users,
            stats.total_matches,
            stats.failed,
            stats.duration
        );
        Ok(stats)
    }

    /// On-demand recompute for one user, e.g. after a skill change
    pub async fn recompute_user(
        &self,
        user_id: &str,
        algorithm: Algorithm,
    ) -> Result<UserRunStats> {
        let started = Instant::now();
        let snapshot = self.engine.build_corpus_snapshot(algorithm).await?;
        let matches_saved =
            recompute_one(&self.engine, &snapshot, user_id, self.config.limit_per_user).await?;
        Ok(UserRunStats {
            user_id: user_id.to_string(),
            matches_saved,
            duration: started.elapsed(),
        })
    }

    /// Delete cached matches older than the given age. Gaps go with them.
    pub async fn cleanup_old_matches(&self, days: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(days);
        let deleted = self.matches.delete_older_than(cutoff).await?;
        log::info!("cleanup: deleted {} matches older than {} days", deleted, days);
        Ok(deleted)
    }
}

async fn recompute_one(
    engine: &MatchEngine,
    snapshot: &CorpusSnapshot,
    user_id: &str,
    limit: usize,
) -> Result<usize> {
    let matches = engine
        .compute_matches_with_snapshot(user_id, limit, snapshot)
        .await?;
    engine.save_matches(user_id, matches).await
}
