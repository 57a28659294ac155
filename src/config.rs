//! Configuration management for the skill matcher

use crate::error::{Result, SkillMatcherError};
use crate::matching::tfidf::TfidfParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub matching: MatchingConfig,
    pub alignment: AlignmentConfig,
    pub batch: BatchConfig,
    pub vocabulary: VocabularyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Default algorithm for recomputes: "basic" or "tfidf"
    pub algorithm: String,
    /// Matches kept per user per run
    pub default_limit: usize,
    /// Pairs with fewer overlapping skills than this are not matches
    pub min_matching_skills: usize,
    /// Jobs with fewer valid skills than this are excluded from the corpus
    pub min_job_skills: usize,
    pub tfidf: TfidfParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Matched-skill count below which the score is scaled down
    pub min_matched_skills: usize,
    /// Importance multiplier for technical skills
    pub technical_boost: f32,
    /// Rows for the same (user, industry) within this window update in place
    pub idempotency_window_minutes: i64,
    /// Industries recorded on each snapshot
    pub snapshot_top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrent per-user computations during a full recompute
    pub concurrency: usize,
    pub limit_per_user: usize,
    /// Default age threshold for match cleanup
    pub cleanup_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Optional TOML file overriding the built-in vocabulary
    pub path: Option<PathBuf>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            algorithm: "basic".to_string(),
            default_limit: 50,
            min_matching_skills: 2,
            min_job_skills: 2,
            tfidf: TfidfParams::default(),
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            min_matched_skills: 3,
            technical_boost: 1.2,
            idempotency_window_minutes: 60,
            snapshot_top_n: 5,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            limit_per_user: 50,
            cleanup_days: 7,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                SkillMatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            SkillMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-matcher")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_documented_constants() {
        let config = Config::default();
        assert_eq!(config.matching.min_matching_skills, 2);
        assert_eq!(config.matching.default_limit, 50);
        assert_eq!(config.matching.tfidf.max_features, 5000);
        assert!((config.matching.tfidf.max_df - 0.95).abs() < 1e-6);
        assert_eq!(config.alignment.min_matched_skills, 3);
        assert!((config.alignment.technical_boost - 1.2).abs() < 1e-6);
        assert_eq!(config.alignment.idempotency_window_minutes, 60);
        assert_eq!(config.batch.cleanup_days, 7);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.matching.algorithm = "tfidf".to_string();
        config.batch.concurrency = 8;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.matching.algorithm, "tfidf");
        assert_eq!(loaded.batch.concurrency, 8);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.matching.algorithm, "basic");
    }
}
