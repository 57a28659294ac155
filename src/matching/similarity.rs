//! Multi-metric similarity scoring between normalized skill sets

use crate::normalize::NormalizedSkillSet;
use crate::vocabulary::SkillVocabulary;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Extra credit for technical skills the user actually has, as a fraction of
/// the base proficiency*importance term
const TECHNICAL_MATCH_BONUS: f32 = 0.5;

/// Fusion weights. Weighted similarity dominates because it is the only
/// metric informed by proficiency/importance magnitude.
const JACCARD_WEIGHT: f32 = 0.2;
const COSINE_WEIGHT: f32 = 0.3;
const WEIGHTED_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimilarityScores {
    pub jaccard: f32,
    pub cosine: f32,
    pub weighted: f32,
    pub overall: f32,
}

impl SimilarityScores {
    pub fn zero() -> Self {
        Self {
            jaccard: 0.0,
            cosine: 0.0,
            weighted: 0.0,
            overall: 0.0,
        }
    }
}

/// Compute Jaccard, cosine, and importance-weighted similarity between a
/// user's and a job's normalized skill sets, fused into one overall score
pub fn calculate_similarity(
    user: &NormalizedSkillSet,
    job: &NormalizedSkillSet,
    vocabulary: &SkillVocabulary,
) -> SimilarityScores {
    let union: BTreeSet<&String> = user.skill_ids().chain(job.skill_ids()).collect();
    if union.is_empty() {
        return SimilarityScores::zero();
    }

    let intersection_count = job.skill_ids().filter(|id| user.contains(id)).count();
    let jaccard = intersection_count as f32 / union.len() as f32;

    // Aligned dense vectors over the sorted union; missing entries are 0
    let user_vector: Array1<f32> = union.iter().map(|id| user.weight(id)).collect();
    let job_vector: Array1<f32> = union.iter().map(|id| job.weight(id)).collect();
    let cosine = cosine_similarity(&user_vector, &job_vector);

    // Importance-weighted similarity over the job's requirements, with a
    // bonus for technical skills the user actually has
    let mut weighted_sum = 0.0_f32;
    let mut total_weight = 0.0_f32;
    let mut technical_bonus = 0.0_f32;

    for (skill_id, job_entry) in job.iter() {
        let importance = job_entry.weight;
        let proficiency = user.weight(skill_id);
        let base = proficiency * importance;

        weighted_sum += base;
        total_weight += importance;

        if proficiency > 0.0 && vocabulary.is_technical(skill_id) {
            technical_bonus += base * TECHNICAL_MATCH_BONUS;
        }
    }

    let mut weighted = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };
    if total_weight > 0.0 {
        weighted = (weighted + technical_bonus / total_weight).min(1.0);
    }

    let overall = jaccard * JACCARD_WEIGHT + cosine * COSINE_WEIGHT + weighted * WEIGHTED_WEIGHT;

    SimilarityScores {
        jaccard,
        cosine,
        weighted,
        overall,
    }
}

/// Cosine similarity of two aligned vectors; zero-magnitude vectors score 0
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    let dot = a.dot(b);
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cosine = dot / (norm_a * norm_b);
    if cosine.is_nan() {
        0.0
    } else {
        cosine
    }
}
