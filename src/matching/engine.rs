//! The match engine: corpus snapshotting, per-user computation, and
//! persistence of results with their gap records
//!
//! Computation is pure with respect to the stores: `compute_matches` writes
//! nothing, `save_matches` replaces a user's cached matches atomically.

use crate::config::MatchingConfig;
use crate::error::{Result, SkillMatcherError};
use crate::matching::gaps::{analyze_skill_gaps, build_gap_report, build_skill_gaps};
use crate::matching::ranker::rank_matches;
use crate::matching::similarity::{calculate_similarity, SimilarityScores};
use crate::matching::tfidf::VectorSpace;
use crate::matching::{Algorithm, CorpusJob, GapReport, JobCorpus, MatchResult};
use crate::normalize::{NormalizedSkillSet, Side, SkillNormalizer};
use crate::store::{JobStore, MatchStore, SkillStore};
use crate::vocabulary::SkillVocabulary;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The comparable corpus for one run: normalized jobs plus, for the
/// vector-space algorithm, the fitted TF-IDF space. Immutable once built;
/// shared read-only across per-user computations.
pub struct CorpusSnapshot {
    pub corpus: JobCorpus,
    pub vector_space: Option<VectorSpace>,
    pub algorithm: Algorithm,
}

/// Per-user rollup of cached match scores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub total_matches: usize,
    pub average_similarity: f32,
    pub high_matches: usize,
    pub medium_matches: usize,
    pub low_matches: usize,
    pub best_match_score: f32,
}

pub struct MatchEngine {
    skills: Arc<dyn SkillStore>,
    jobs: Arc<dyn JobStore>,
    matches: Arc<dyn MatchStore>,
    vocabulary: Arc<SkillVocabulary>,
    config: MatchingConfig,
}

impl MatchEngine {
    pub fn new(
        skills: Arc<dyn SkillStore>,
        jobs: Arc<dyn JobStore>,
        matches: Arc<dyn MatchStore>,
        vocabulary: Arc<SkillVocabulary>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            skills,
            jobs,
            matches,
            vocabulary,
            config,
        }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    /// Normalize the active job corpus, dropping jobs with fewer than two
    /// valid skills, and fit the vector space when the algorithm needs one
    pub async fn build_corpus_snapshot(&self, algorithm: Algorithm) -> Result<CorpusSnapshot> {
        let normalizer = SkillNormalizer::new(&self.vocabulary);
        let mut jobs = Vec::new();
        for posting in self.jobs.active_jobs().await? {
            let skills = normalizer.normalize(&posting.skills, Side::Job);
            if skills.len() < self.config.min_job_skills {
                log::debug!(
                    "excluding job {} from corpus: {} valid skills",
                    posting.id,
                    skills.len()
                );
                continue;
            }
            jobs.push(CorpusJob {
                job_id: posting.id.clone(),
                summary: posting.summary(),
                skills,
            });
        }
        let corpus = JobCorpus { jobs };

        let vector_space = match algorithm {
            Algorithm::Basic => None,
            Algorithm::Tfidf => Some(VectorSpace::fit(
                &corpus,
                &self.vocabulary,
                &self.config.tfidf,
            )?),
        };

        log::info!(
            "corpus snapshot: {} comparable jobs ({})",
            corpus.len(),
            algorithm.version()
        );
        Ok(CorpusSnapshot {
            corpus,
            vector_space,
            algorithm,
        })
    }

    /// Compute ranked matches for one user. Pure: nothing is persisted.
    pub async fn compute_matches(
        &self,
        user_id: &str,
        limit: usize,
        algorithm: Algorithm,
    ) -> Result<Vec<MatchResult>> {
        let snapshot = self.build_corpus_snapshot(algorithm).await?;
        self.compute_matches_with_snapshot(user_id, limit, &snapshot)
            .await
    }

    /// Compute against a pre-built snapshot. Batch runs build the snapshot
    /// once and call this per user.
    pub async fn compute_matches_with_snapshot(
        &self,
        user_id: &str,
        limit: usize,
        snapshot: &CorpusSnapshot,
    ) -> Result<Vec<MatchResult>> {
        let user = self.user_skill_set(user_id).await?;
        if user.is_empty() || snapshot.corpus.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = match snapshot.algorithm {
            Algorithm::Basic => self.pairwise_matches(user_id, &user, &snapshot.corpus),
            Algorithm::Tfidf => self.vector_space_matches(user_id, &user, snapshot)?,
        };

        results.truncate(limit);
        Ok(results)
    }

    /// Pairwise multi-metric scoring over every corpus job
    fn pairwise_matches(
        &self,
        user_id: &str,
        user: &NormalizedSkillSet,
        corpus: &JobCorpus,
    ) -> Vec<MatchResult> {
        let computed_at = Utc::now();
        let mut results = Vec::new();

        for job in &corpus.jobs {
            let summary = analyze_skill_gaps(user, &job.skills);
            // Below the overlap floor the score is noise, not a match
            if summary.total_matching < self.config.min_matching_skills {
                continue;
            }
            let scores = calculate_similarity(user, &job.skills, &self.vocabulary);
            results.push(MatchResult {
                user_id: user_id.to_string(),
                job_id: job.job_id.clone(),
                scores,
                skill_coverage: summary.coverage,
                matching_skills: summary.matching_skills,
                missing_skills: summary.missing_skills,
                total_job_skills: job.skills.len(),
                total_user_skills: user.len(),
                algorithm_version: Algorithm::Basic.version().to_string(),
                computed_at,
                job: job.summary.clone(),
            });
        }

        rank_matches(&mut results);
        results
    }

    /// One user vector against every job vector in the shared space
    fn vector_space_matches(
        &self,
        user_id: &str,
        user: &NormalizedSkillSet,
        snapshot: &CorpusSnapshot,
    ) -> Result<Vec<MatchResult>> {
        let space = snapshot
            .vector_space
            .as_ref()
            .ok_or_else(|| SkillMatcherError::VectorSpace("snapshot has no fitted space".into()))?;

        let computed_at = Utc::now();
        let similarities = space.user_similarities(user, &self.vocabulary);
        let mut results = Vec::new();

        for (job, similarity) in snapshot.corpus.jobs.iter().zip(similarities) {
            if similarity <= self.config.tfidf.min_similarity {
                continue;
            }
            let summary = analyze_skill_gaps(user, &job.skills);
            // The vector-space similarity ranks; the set metrics still come
            // from the pairwise scorer so stored results stay comparable
            // across algorithms
            let pairwise = calculate_similarity(user, &job.skills, &self.vocabulary);
            results.push(MatchResult {
                user_id: user_id.to_string(),
                job_id: job.job_id.clone(),
                scores: SimilarityScores {
                    jaccard: pairwise.jaccard,
                    cosine: similarity,
                    weighted: pairwise.weighted,
                    overall: similarity,
                },
                skill_coverage: summary.coverage,
                matching_skills: summary.matching_skills,
                missing_skills: summary.missing_skills,
                total_job_skills: job.skills.len(),
                total_user_skills: user.len(),
                algorithm_version: Algorithm::Tfidf.version().to_string(),
                computed_at,
                job: job.summary.clone(),
            });
        }

        results.sort_by(|a, b| {
            b.scores
                .overall
                .total_cmp(&a.scores.overall)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(results)
    }

    /// Replace the user's cached matches with this set, attaching a gap
    /// record per missing skill. Returns the number of matches saved.
    pub async fn save_matches(&self, user_id: &str, matches: Vec<MatchResult>) -> Result<usize> {
        let normalizer = SkillNormalizer::new(&self.vocabulary);
        let mut job_sets: HashMap<String, NormalizedSkillSet> = HashMap::new();

        let mut rows = Vec::with_capacity(matches.len());
        for result in matches {
            let job_set = match job_sets.get(&result.job_id) {
                Some(set) => set.clone(),
                None => {
                    let posting = self
                        .jobs
                        .job(&result.job_id)
                        .await?
                        .ok_or_else(|| SkillMatcherError::UnknownJob(result.job_id.clone()))?;
                    let set = normalizer.normalize(&posting.skills, Side::Job);
                    job_sets.insert(result.job_id.clone(), set.clone());
                    set
                }
            };
            let gaps = build_skill_gaps(&job_set, &result.missing_skills, &self.vocabulary);
            rows.push((result, gaps));
        }

        let saved = self.matches.replace_matches(user_id, rows).await?;
        log::info!("saved {} matches for user {}", saved, user_id);
        Ok(saved)
    }

    /// On-demand gap report for one (user, job) pair. Unknown ids are
    /// caller errors, not empty results.
    pub async fn compute_skill_gaps(&self, user_id: &str, job_id: &str) -> Result<GapReport> {
        let user = self.user_skill_set(user_id).await?;
        let posting = self
            .jobs
            .job(job_id)
            .await?
            .ok_or_else(|| SkillMatcherError::UnknownJob(job_id.to_string()))?;

        let normalizer = SkillNormalizer::new(&self.vocabulary);
        let job = normalizer.normalize(&posting.skills, Side::Job);
        Ok(build_gap_report(
            user_id,
            job_id,
            &user,
            &job,
            &self.vocabulary,
        ))
    }

    /// Score-band rollup of the user's cached matches
    pub async fn match_statistics(&self, user_id: &str) -> Result<MatchStatistics> {
        let matches = self.matches.matches_for_user(user_id).await?;
        if matches.is_empty() {
            return Ok(MatchStatistics::default());
        }

        let mut stats = MatchStatistics {
            total_matches: matches.len(),
            ..Default::default()
        };
        let mut sum = 0.0f32;
        for result in &matches {
            let score = result.scores.overall;
            sum += score;
            stats.best_match_score = stats.best_match_score.max(score);
            if score >= 0.7 {
                stats.high_matches += 1;
            } else if score >= 0.4 {
                stats.medium_matches += 1;
            } else {
                stats.low_matches += 1;
            }
        }
        stats.average_similarity = sum / matches.len() as f32;
        Ok(stats)
    }

    async fn user_skill_set(&self, user_id: &str) -> Result<NormalizedSkillSet> {
        let assertions = self.skills.user_skills(user_id).await?;
        let normalizer = SkillNormalizer::new(&self.vocabulary);
        Ok(normalizer.normalize(&assertions, Side::User))
    }
}
