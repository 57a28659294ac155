//! Vector-space matching: a shared TF-IDF model over the whole job corpus
//!
//! Each job's normalized skills are expanded into their variation sets and
//! repeated in proportion to importance, forming one document per job. A
//! single TF-IDF fit over all documents gives a space in which one user
//! vector can be compared against every job at once, which scales better
//! than pairwise scoring for large corpora.
//!
//! The fitted space is an immutable snapshot: built once per batch run and
//! shared read-only across per-user computations.

use crate::error::{Result, SkillMatcherError};
use crate::matching::JobCorpus;
use crate::normalize::NormalizedSkillSet;
use crate::vocabulary::SkillVocabulary;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Token pattern preserving symbols common in technical terms (C++, C#, node.js)
const TOKEN_PATTERN: &str = r"[a-zA-Z][a-zA-Z0-9+#.]*";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Vocabulary cap; most frequent terms win
    pub max_features: usize,
    /// Terms appearing in more than this fraction of documents are dropped
    pub max_df: f32,
    /// Similarity floor below which a job is not surfaced
    pub min_similarity: f32,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: 5000,
            max_df: 0.95,
            min_similarity: 0.01,
        }
    }
}

/// Fitted term-weighting model: alphabetical term vocabulary with smoothed
/// inverse document frequencies
struct TfidfModel {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f32>,
    document_frequency: Vec<usize>,
    tokenizer: Regex,
}

fn build_tokenizer() -> Result<Regex> {
    Regex::new(TOKEN_PATTERN)
        .map_err(|e| SkillMatcherError::VectorSpace(format!("bad token pattern: {}", e)))
}

/// Lowercased unigrams + bigrams from a skill document
fn tokenize_text(tokenizer: &Regex, text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let unigrams: Vec<String> = tokenizer
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect();
    let mut tokens = unigrams.clone();
    for pair in unigrams.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

impl TfidfModel {
    fn fit(documents: &[Vec<String>], params: &TfidfParams, tokenizer: Regex) -> Result<Self> {
        let n_docs = documents.len();
        let mut doc_frequency: HashMap<&str, usize> = HashMap::new();
        let mut collection_frequency: HashMap<&str, usize> = HashMap::new();

        for tokens in documents {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                *collection_frequency.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_frequency.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        // Drop near-ubiquitous terms, then cap the vocabulary by corpus
        // frequency with an alphabetical tiebreak for determinism
        let max_df_count = (params.max_df * n_docs as f32).floor() as usize;
        let mut candidates: Vec<(&str, usize)> = doc_frequency
            .iter()
            .filter(|(_, &df)| n_docs <= 1 || df <= max_df_count.max(1))
            .map(|(&term, &df)| (term, df))
            .collect();
        candidates.sort_by(|a, b| {
            collection_frequency[b.0]
                .cmp(&collection_frequency[a.0])
                .then_with(|| a.0.cmp(b.0))
        });
        candidates.truncate(params.max_features);

        let mut terms: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let mut index = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        let mut document_frequency = Vec::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            let df = doc_frequency[term.as_str()];
            index.insert(term.clone(), i);
            // Smoothed idf, as if one extra document contained every term
            idf.push(((1.0 + n_docs as f32) / (1.0 + df as f32)).ln() + 1.0);
            document_frequency.push(df);
        }

        Ok(Self {
            terms,
            index,
            idf,
            document_frequency,
            tokenizer,
        })
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize_text(&self.tokenizer, text)
    }

    /// L2-normalized tf-idf vector; cosine of two transformed vectors is
    /// their dot product
    fn transform(&self, tokens: &[String]) -> Array1<f32> {
        let mut vector = Array1::<f32>::zeros(self.terms.len());
        for token in tokens {
            if let Some(&i) = self.index.get(token.as_str()) {
                vector[i] += 1.0;
            }
        }
        for (i, value) in vector.iter_mut().enumerate() {
            *value *= self.idf[i];
        }
        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector /= norm;
        }
        vector
    }
}

/// Per-term introspection of the fitted space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub term: String,
    pub avg_tfidf_score: f32,
    pub document_frequency: usize,
}

/// The corpus-level fit: one TF-IDF model plus every job's vector.
/// Build once per run; read-only afterwards.
pub struct VectorSpace {
    model: TfidfModel,
    job_vectors: Vec<Array1<f32>>,
}

impl VectorSpace {
    /// Fit the shared space over the active job corpus
    pub fn fit(
        corpus: &JobCorpus,
        vocabulary: &SkillVocabulary,
        params: &TfidfParams,
    ) -> Result<Self> {
        let tokenizer = build_tokenizer()?;
        let token_docs: Vec<Vec<String>> = corpus
            .jobs
            .iter()
            .map(|job| {
                let text = skill_document(&job.skills, vocabulary, |entry| entry.weight);
                tokenize_text(&tokenizer, &text)
            })
            .collect();

        let model = TfidfModel::fit(&token_docs, params, tokenizer)?;
        let job_vectors = token_docs
            .iter()
            .map(|tokens| model.transform(tokens))
            .collect();

        log::info!(
            "fitted vector space: {} jobs, {} terms",
            corpus.len(),
            model.terms.len()
        );

        Ok(Self { model, job_vectors })
    }

    pub fn job_count(&self) -> usize {
        self.job_vectors.len()
    }

    pub fn feature_count(&self) -> usize {
        self.model.terms.len()
    }

    /// Cosine similarity of one user against every job, in corpus order
    pub fn user_similarities(
        &self,
        user: &NormalizedSkillSet,
        vocabulary: &SkillVocabulary,
    ) -> Vec<f32> {
        let text = skill_document(user, vocabulary, |entry| entry.weight * entry.confidence);
        let tokens = self.model.tokenize(&text);
        let user_vector = self.model.transform(&tokens);

        self.job_vectors
            .iter()
            .map(|job_vector| user_vector.dot(job_vector))
            .collect()
    }

    /// Top-N terms by average tf-idf weight across the corpus
    pub fn feature_importance(&self, top_n: usize) -> Vec<FeatureImportance> {
        if self.job_vectors.is_empty() {
            return Vec::new();
        }
        let n = self.job_vectors.len() as f32;
        let mut averages: Vec<(usize, f32)> = (0..self.model.terms.len())
            .map(|i| {
                let sum: f32 = self.job_vectors.iter().map(|v| v[i]).sum();
                (i, sum / n)
            })
            .collect();
        averages.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        averages
            .into_iter()
            .take(top_n)
            .map(|(i, avg)| FeatureImportance {
                term: self.model.terms[i].clone(),
                avg_tfidf_score: avg,
                document_frequency: self.model.document_frequency[i],
            })
            .collect()
    }
}

/// Build one owner's skill document: every variation of every skill,
/// repeated `max(1, round(weight * 5))` times
fn skill_document<F>(
    skills: &NormalizedSkillSet,
    vocabulary: &SkillVocabulary,
    weight_of: F,
) -> String
where
    F: Fn(&crate::normalize::SkillEntry) -> f32,
{
    let mut parts: Vec<String> = Vec::new();
    for (skill_id, entry) in skills.iter() {
        let repetitions = ((weight_of(entry) * 5.0).round() as usize).max(1);
        for variation in vocabulary.variations(skill_id) {
            for _ in 0..repetitions {
                parts.push(variation.clone());
            }
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{CorpusJob, JobSummary};
    use crate::normalize::{Side, SkillAssertion, SkillNormalizer};

    fn corpus_job(job_id: &str, skills: &[(&str, f32)]) -> CorpusJob {
        let vocab = SkillVocabulary::new().unwrap();
        let assertions: Vec<SkillAssertion> = skills
            .iter()
            .map(|(name, w)| SkillAssertion::new(name, *w))
            .collect();
        CorpusJob {
            job_id: job_id.to_string(),
            summary: JobSummary::default(),
            skills: SkillNormalizer::new(&vocab).normalize(&assertions, Side::Job),
        }
    }

    fn user_set(skills: &[(&str, f32)]) -> NormalizedSkillSet {
        let vocab = SkillVocabulary::new().unwrap();
        let assertions: Vec<SkillAssertion> = skills
            .iter()
            .map(|(name, w)| SkillAssertion::new(name, *w))
            .collect();
        SkillNormalizer::new(&vocab).normalize(&assertions, Side::User)
    }

    fn fit(jobs: Vec<CorpusJob>) -> (VectorSpace, SkillVocabulary) {
        let vocab = SkillVocabulary::new().unwrap();
        let corpus = JobCorpus { jobs };
        let space = VectorSpace::fit(&corpus, &vocab, &TfidfParams::default()).unwrap();
        (space, vocab)
    }

    #[test]
    fn test_fit_on_empty_corpus_is_empty_not_fatal() {
        let (space, vocab) = fit(vec![]);
        assert_eq!(space.job_count(), 0);
        let sims = space.user_similarities(&user_set(&[("python", 0.8)]), &vocab);
        assert!(sims.is_empty());
    }

    #[test]
    fn test_matching_job_scores_higher() {
        let (space, vocab) = fit(vec![
            corpus_job("python-job", &[("python", 1.0), ("django", 1.0)]),
            corpus_job("frontend-job", &[("react", 1.0), ("css", 1.0)]),
        ]);
        let sims = space.user_similarities(&user_set(&[("python", 0.9), ("django", 0.7)]), &vocab);
        assert_eq!(sims.len(), 2);
        assert!(sims[0] > sims[1]);
        assert!(sims[0] > 0.5);
    }

    #[test]
    fn test_variation_expansion_bridges_synonyms() {
        // Job says "python"; user claims "py" only via the variation table
        let (space, vocab) = fit(vec![
            corpus_job("py-job", &[("python", 1.0), ("docker", 1.0)]),
            corpus_job("other", &[("mentoring", 1.0), ("negotiation", 1.0)]),
        ]);
        let sims = space.user_similarities(&user_set(&[("python", 0.9)]), &vocab);
        assert!(sims[0] > sims[1]);
    }

    #[test]
    fn test_deterministic_fit() {
        let jobs = || {
            vec![
                corpus_job("a", &[("python", 1.0), ("docker", 0.8)]),
                corpus_job("b", &[("react", 1.0), ("css", 0.5)]),
                corpus_job("c", &[("python", 0.5), ("aws", 1.2)]),
            ]
        };
        let (first, vocab) = fit(jobs());
        let (second, _) = fit(jobs());
        assert_eq!(first.feature_count(), second.feature_count());
        let user = user_set(&[("python", 0.8), ("aws", 0.6)]);
        assert_eq!(
            first.user_similarities(&user, &vocab),
            second.user_similarities(&user, &vocab)
        );
    }

    #[test]
    fn test_vectors_are_l2_normalized() {
        let (space, _) = fit(vec![
            corpus_job("a", &[("python", 1.0), ("docker", 0.8)]),
            corpus_job("b", &[("react", 1.0), ("css", 0.5)]),
        ]);
        for v in &space.job_vectors {
            let norm = v.dot(v).sqrt();
            assert!((norm - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_feature_importance_reports_terms() {
        let (space, _) = fit(vec![
            corpus_job("a", &[("python", 1.0), ("docker", 0.8)]),
            corpus_job("b", &[("python", 1.0), ("css", 0.5)]),
        ]);
        let features = space.feature_importance(5);
        assert!(!features.is_empty());
        assert!(features.len() <= 5);
        assert!(features[0].avg_tfidf_score >= features[features.len() - 1].avg_tfidf_score);
    }
}
