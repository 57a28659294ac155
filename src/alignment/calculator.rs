//! Alignment scoring against industry demand profiles
//!
//! Each recompute writes one row per industry (deduplicated through the
//! idempotency window) and one summary snapshot, so timeline reads never
//! rescan raw skills.

use crate::alignment::timeline::{build_timeline, top_industries, AlignmentTimeline};
use crate::config::AlignmentConfig;
use crate::error::Result;
use crate::normalize::{NormalizedSkillSet, Side, SkillNormalizer};
use crate::store::{
    AlignmentSnapshot, AlignmentStore, IndustryAlignment, IndustryProfile, IndustryProfileSource,
    SkillStore,
};
use crate::vocabulary::{SkillClass, SkillVocabulary};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct AlignmentCalculator {
    skills: Arc<dyn SkillStore>,
    alignments: Arc<dyn AlignmentStore>,
    industries: Arc<dyn IndustryProfileSource>,
    vocabulary: Arc<SkillVocabulary>,
    config: AlignmentConfig,
}

impl AlignmentCalculator {
    pub fn new(
        skills: Arc<dyn SkillStore>,
        alignments: Arc<dyn AlignmentStore>,
        industries: Arc<dyn IndustryProfileSource>,
        vocabulary: Arc<SkillVocabulary>,
        config: AlignmentConfig,
    ) -> Self {
        Self {
            skills,
            alignments,
            industries,
            vocabulary,
            config,
        }
    }

    /// Score the user against every industry profile, persist the rows and
    /// a snapshot, and return industry -> score
    pub async fn calculate_current_alignment(
        &self,
        user_id: &str,
        trigger_event: &str,
    ) -> Result<BTreeMap<String, f32>> {
        let assertions = self.skills.user_skills(user_id).await?;
        let normalizer = SkillNormalizer::new(&self.vocabulary);
        let user = normalizer.normalize(&assertions, Side::User);

        let profiles = self.industries.industry_profiles().await?;
        let window = Duration::minutes(self.config.idempotency_window_minutes);
        // One instant per recompute; every row and the snapshot share it
        let now = Utc::now();

        let mut scores: BTreeMap<String, f32> = BTreeMap::new();
        for profile in &profiles {
            let row = self.score_industry(user_id, &user, profile, now);
            scores.insert(profile.industry.clone(), row.alignment_score);
            self.alignments.save_alignment(row, window).await?;
        }

        self.snapshot(user_id, &user, &scores, trigger_event, now)
            .await?;
        log::info!(
            "alignment recomputed for user {} across {} industries ({})",
            user_id,
            profiles.len(),
            trigger_event
        );
        Ok(scores)
    }

    /// Recompute in response to a skill-set change
    pub async fn on_skill_change(&self, user_id: &str) -> Result<BTreeMap<String, f32>> {
        self.calculate_current_alignment(user_id, "skill_update").await
    }

    fn score_industry(
        &self,
        user_id: &str,
        user: &NormalizedSkillSet,
        profile: &IndustryProfile,
        calculated_at: DateTime<Utc>,
    ) -> IndustryAlignment {
        let mut numerator = 0.0f32;
        let mut denominator = 0.0f32;
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        for (skill_id, demand) in &profile.skills {
            let canonical = self.vocabulary.canonicalize(skill_id);
            // The boost lands in both sums: a technical skill raises the
            // bar as much as it raises the credit
            let mut importance = demand.importance;
            if self.vocabulary.is_technical(&canonical) {
                importance *= self.config.technical_boost;
            }
            denominator += importance;

            match user.get(&canonical) {
                Some(entry) => {
                    numerator += entry.weight * importance * entry.confidence;
                    matched.push(canonical);
                }
                None => missing.push(canonical),
            }
        }

        let mut score = if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        };
        // Thin evidence: a couple of overlapping skills should not read as
        // industry fit
        if matched.len() < self.config.min_matched_skills {
            score *= matched.len() as f32 / self.config.min_matched_skills as f32;
        }
        score = score.clamp(0.0, 1.0);

        let total = profile.skills.len();
        IndustryAlignment {
            user_id: user_id.to_string(),
            industry_category: profile.industry.clone(),
            alignment_score: score,
            skill_coverage: if total > 0 {
                matched.len() as f32 / total as f32
            } else {
                0.0
            },
            matched_skill_ids: matched,
            missing_skill_ids: missing,
            total_industry_skills: total,
            skill_count_at_calculation: user.len(),
            calculated_at,
        }
    }

    async fn snapshot(
        &self,
        user_id: &str,
        user: &NormalizedSkillSet,
        scores: &BTreeMap<String, f32>,
        trigger_event: &str,
        calculated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut technical = 0;
        let mut soft = 0;
        for skill_id in user.skill_ids() {
            if self.vocabulary.is_technical(skill_id) {
                technical += 1;
            }
            if self.vocabulary.classify(skill_id) == SkillClass::SoftSkill {
                soft += 1;
            }
        }

        let mut ranked: Vec<(&String, &f32)> = scores.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top_industry_alignments: BTreeMap<String, f32> = ranked
            .into_iter()
            .take(self.config.snapshot_top_n)
            .map(|(industry, score)| (industry.clone(), *score))
            .collect();

        self.alignments
            .insert_snapshot(AlignmentSnapshot {
                user_id: user_id.to_string(),
                total_skills: user.len(),
                technical_skills: technical,
                soft_skills: soft,
                top_industry_alignments,
                trigger_event: trigger_event.to_string(),
                calculated_at,
            })
            .await
    }

    /// Read the persisted history back as a per-day timeline of the
    /// currently top-N industries
    pub async fn alignment_timeline(
        &self,
        user_id: &str,
        days_back: i64,
        top_n: usize,
    ) -> Result<AlignmentTimeline> {
        let now = Utc::now();
        let rows = self
            .alignments
            .alignments_since(user_id, now - Duration::days(days_back))
            .await?;
        let industries = top_industries(&rows, now, top_n);
        let points = build_timeline(&rows, &industries);
        Ok(AlignmentTimeline {
            user_id: user_id.to_string(),
            days_back,
            industries,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SkillAssertion;
    use crate::store::{InMemoryStore, IndustrySkill};

    fn profile(industry: &str, skills: &[(&str, f32)]) -> IndustryProfile {
        IndustryProfile {
            industry: industry.to_string(),
            skills: skills
                .iter()
                .map(|(name, importance)| {
                    (
                        name.to_string(),
                        IndustrySkill {
                            display_name: name.to_string(),
                            importance: *importance,
                        },
                    )
                })
                .collect(),
        }
    }

    async fn calculator_with(
        skills: &[(&str, f32, f32)],
        profiles: Vec<IndustryProfile>,
    ) -> (AlignmentCalculator, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let assertions = skills
            .iter()
            .map(|(name, weight, confidence)| {
                SkillAssertion::new(name, *weight).with_confidence(*confidence)
            })
            .collect();
        store.insert_user("u1", assertions).await;
        for profile in profiles {
            store.insert_industry(profile).await;
        }
        let vocab = Arc::new(SkillVocabulary::new().unwrap());
        let calc = AlignmentCalculator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            vocab,
            AlignmentConfig::default(),
        );
        (calc, store)
    }

    #[tokio::test]
    async fn test_no_overlap_scores_zero() {
        let (calc, _) = calculator_with(
            &[("mentoring", 0.9, 1.0), ("negotiation", 0.8, 1.0)],
            vec![profile("Technology", &[("python", 1.0), ("aws", 0.9), ("docker", 0.8)])],
        )
        .await;
        let scores = calc.calculate_current_alignment("u1", "manual").await.unwrap();
        assert_eq!(scores["Technology"], 0.0);
    }

    #[tokio::test]
    async fn test_thin_overlap_is_scaled_down() {
        // Full proficiency in 2 of 4 industry skills; with min 3 matched
        // the raw ratio gets scaled by 2/3
        let (calc, _) = calculator_with(
            &[("python", 1.0, 1.0), ("aws", 1.0, 1.0)],
            vec![profile(
                "Technology",
                &[("python", 1.0), ("aws", 1.0), ("docker", 1.0), ("sql", 1.0)],
            )],
        )
        .await;
        let scores = calc.calculate_current_alignment("u1", "manual").await.unwrap();
        // user weights boosted to 1.0 cap; all four are technical so the
        // boost cancels between sums: raw = 2/4, scaled = 0.5 * 2/3
        let score = scores["Technology"];
        assert!((score - 0.5 * (2.0 / 3.0)).abs() < 1e-4, "score = {}", score);
    }

    #[tokio::test]
    async fn test_scores_clamped_and_rows_persisted() {
        let (calc, store) = calculator_with(
            &[("python", 1.0, 1.0), ("aws", 1.0, 1.0), ("docker", 1.0, 1.0)],
            vec![profile("Technology", &[("python", 1.0), ("aws", 1.0), ("docker", 1.0)])],
        )
        .await;
        let scores = calc.calculate_current_alignment("u1", "manual").await.unwrap();
        let score = scores["Technology"];
        assert!(score > 0.9 && score <= 1.0);

        let rows = store
            .alignments_since("u1", Utc::now() - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matched_skill_ids.len(), 3);
        assert!(rows[0].missing_skill_ids.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_counts_and_trigger() {
        let (calc, store) = calculator_with(
            &[("python", 0.8, 1.0), ("mentoring", 0.9, 1.0)],
            vec![
                profile("Technology", &[("python", 1.0), ("aws", 1.0), ("sql", 1.0)]),
                profile("Education", &[("mentoring", 1.0), ("teaching", 1.0), ("writing", 1.0)]),
            ],
        )
        .await;
        calc.on_skill_change("u1").await.unwrap();

        let snapshots = store.snapshots_for_user("u1").await.unwrap();
        assert_eq!(snapshots.len(), 1);
        let snapshot = &snapshots[0];
        assert_eq!(snapshot.total_skills, 2);
        assert_eq!(snapshot.technical_skills, 1);
        assert_eq!(snapshot.soft_skills, 1);
        assert_eq!(snapshot.trigger_event, "skill_update");
        assert_eq!(snapshot.top_industry_alignments.len(), 2);
    }

    #[tokio::test]
    async fn test_one_recompute_shares_one_timestamp() {
        let (calc, store) = calculator_with(
            &[("python", 0.8, 1.0)],
            vec![
                profile("Technology", &[("python", 1.0), ("aws", 1.0)]),
                profile("Finance", &[("sql", 1.0), ("excel", 1.0)]),
            ],
        )
        .await;
        calc.calculate_current_alignment("u1", "manual").await.unwrap();

        let rows = store
            .alignments_since("u1", Utc::now() - Duration::days(1))
            .await
            .unwrap();
        let snapshots = store.snapshots_for_user("u1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].calculated_at, rows[1].calculated_at);
        assert_eq!(snapshots[0].calculated_at, rows[0].calculated_at);
    }

    #[tokio::test]
    async fn test_rapid_recomputes_collapse_into_one_row() {
        let (calc, store) = calculator_with(
            &[("python", 0.8, 1.0)],
            vec![profile("Technology", &[("python", 1.0), ("aws", 1.0)])],
        )
        .await;
        calc.calculate_current_alignment("u1", "manual").await.unwrap();
        calc.calculate_current_alignment("u1", "manual").await.unwrap();

        let rows = store
            .alignments_since("u1", Utc::now() - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        // Snapshots are append-only history
        assert_eq!(store.snapshots_for_user("u1").await.unwrap().len(), 2);
    }
}
