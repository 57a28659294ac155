//! Skill set normalization: filtering, canonicalization, and technical weighting
//!
//! Both user-side and job-side assertions go through the same path before any
//! comparison. Similarity is undefined over un-normalized sets.

use crate::vocabulary::SkillVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A claim that an owner (user or job) has/requires a skill.
/// Produced externally; read-only input to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssertion {
    pub skill_id: String,
    pub display_name: String,
    /// Proficiency (user side, 0-1) or importance (job side, typically 0-2)
    pub weight: f32,
    /// Extraction confidence, 1.0 for manual entry
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub source: Option<String>,
}

fn default_confidence() -> f32 {
    1.0
}

impl SkillAssertion {
    pub fn new(name: &str, weight: f32) -> Self {
        Self {
            skill_id: name.to_string(),
            display_name: name.to_string(),
            weight,
            confidence: 1.0,
            source: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Which side of a comparison a skill set belongs to. Controls the technical
/// boost multiplier and its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    User,
    Job,
}

impl Side {
    fn technical_boost(self) -> (f32, f32) {
        match self {
            Side::User => (1.2, 1.0),
            Side::Job => (1.3, 2.0),
        }
    }
}

/// One entry of a normalized skill set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub weight: f32,
    pub confidence: f32,
}

/// Canonical skill id -> entry. BTreeMap keeps iteration deterministic,
/// which the ranker and the vector builders rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedSkillSet {
    entries: BTreeMap<String, SkillEntry>,
}

impl NormalizedSkillSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn weight(&self, skill_id: &str) -> f32 {
        self.entries.get(skill_id).map(|e| e.weight).unwrap_or(0.0)
    }

    pub fn get(&self, skill_id: &str) -> Option<&SkillEntry> {
        self.entries.get(skill_id)
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.entries.contains_key(skill_id)
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SkillEntry)> {
        self.entries.iter()
    }

    fn merge_max(&mut self, skill_id: String, entry: SkillEntry) {
        self.entries
            .entry(skill_id)
            .and_modify(|existing| {
                // Two raw labels collapsed to one id: keep the stronger claim
                if entry.weight > existing.weight {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }
}

/// Applies the vocabulary's filters and tables to raw assertions
pub struct SkillNormalizer<'a> {
    vocabulary: &'a SkillVocabulary,
}

impl<'a> SkillNormalizer<'a> {
    pub fn new(vocabulary: &'a SkillVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Filter, canonicalize, boost, and merge one owner's raw assertions
    pub fn normalize(&self, assertions: &[SkillAssertion], side: Side) -> NormalizedSkillSet {
        let (boost, cap) = side.technical_boost();
        let mut set = NormalizedSkillSet::default();

        for assertion in assertions {
            if !self.vocabulary.is_valid_skill(&assertion.display_name) {
                log::debug!("skipping invalid skill label: {}", assertion.display_name);
                continue;
            }

            let canonical = self.vocabulary.canonicalize(&assertion.display_name);
            let mut weight = assertion.weight;
            if self.vocabulary.is_technical(&canonical) {
                weight = (weight * boost).min(cap);
            }

            set.merge_max(
                canonical,
                SkillEntry {
                    weight,
                    confidence: assertion.confidence,
                },
            );
        }

        set
    }
}
