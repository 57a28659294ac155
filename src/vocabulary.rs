//! Skill vocabulary: validity filters, canonicalization tables, and skill classification
//!
//! The filter and keyword lists are versioned data, not code: `VocabularyData`
//! can be loaded from a TOML file and falls back to the built-in lists. The
//! compiled `SkillVocabulary` is what the rest of the engine consumes.

use crate::error::{Result, SkillMatcherError};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Coarse skill classification used for gap grouping and learning-time estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillClass {
    Language,
    Framework,
    MarkupOrQuery,
    SoftSkill,
    Technical,
    Other,
}

impl SkillClass {
    /// Estimated hours to reach working proficiency from scratch
    pub fn estimated_learning_hours(self) -> u32 {
        match self {
            SkillClass::Language => 80,
            SkillClass::Framework => 40,
            SkillClass::MarkupOrQuery => 20,
            SkillClass::SoftSkill => 15,
            SkillClass::Technical => 30,
            SkillClass::Other => 25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillClass::Language => "language",
            SkillClass::Framework => "framework",
            SkillClass::MarkupOrQuery => "markup_or_query",
            SkillClass::SoftSkill => "soft_skill",
            SkillClass::Technical => "technical",
            SkillClass::Other => "other",
        }
    }
}

impl std::fmt::Display for SkillClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw vocabulary lists, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyData {
    pub version: String,
    /// Extraction noise: URL/corporate fragments, stopwords, standalone gerunds,
    /// malformed partial phrases
    pub noise_terms: Vec<String>,
    /// Job-posting boilerplate that leaks out of description text
    pub boilerplate_terms: Vec<String>,
    /// Overly generic labels that hurt matching quality when used as discriminators
    pub generic_terms: Vec<String>,
    /// Medical-condition terms mis-extracted as skills from healthcare postings
    pub medical_terms: Vec<String>,
    /// "support <word>" labels that are real skills, not fragments
    pub support_allowlist: Vec<String>,
    /// Ordered substring substitutions applied after case-folding
    pub substitutions: Vec<(String, String)>,
    /// Substrings that mark a canonical name as technical
    pub technical_keywords: Vec<String>,
    pub language_keywords: Vec<String>,
    pub framework_keywords: Vec<String>,
    pub markup_keywords: Vec<String>,
    /// Synonym/variation sets keyed by canonical name, used by the
    /// vector-space matcher's document expansion
    pub variations: BTreeMap<String, Vec<String>>,
}

impl Default for VocabularyData {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            noise_terms: strings(&[
                "los", "com", "act", "inc", "ltd", "llc", "corp", "co", "org", "www", "http",
                "https", "the", "and", "or", "but", "with", "for", "from", "about", "into",
                "through", "during", "before", "after", "above", "below", "between", "among",
                "across", "all", "some", "many", "few", "more", "most", "less", "much", "very",
                "too", "so", "just", "only", "also", "even", "still", "already", "yet", "now",
                "then", "adding", "using", "working", "developing", "creating", "building",
                "making", "managing", "leading", "supporting", "helping", "solving", "planning",
                "organizing", "coordinating", "monitoring", "tracking", "reporting", "writing",
                "reading", "speaking", "listening", "thinking", "learning", "teaching",
                "training", "studying", "researching", "analyzing", "testing", "reviewing",
                "evaluating", "assessing", "improving", "updating", "maintaining", "session",
                "sessions", "meeting", "meetings", "conference", "workshop", "locks", "lock",
                "key", "keys", "door", "doors", "window", "windows", "mathematics computer",
                "support browsers", "support developed", "computers mathematics",
                "browsers support",
            ]),
            boilerplate_terms: strings(&[
                "job description", "job", "description", "position", "role", "opportunity",
                "candidate", "resume", "apply", "hiring", "employment", "work", "company",
                "team", "department", "requirements", "qualifications", "responsibilities",
                "benefits", "salary", "location", "remote", "onsite", "full-time", "part-time",
                "contract", "temporary", "entry level", "senior", "junior", "manager",
                "director", "schedule job", "job posting", "job board", "career", "schedule",
                "posting", "board", "opening", "vacancy",
            ]),
            generic_terms: strings(&[
                "innovation", "creativity", "san", "communication", "teamwork",
                "problem solving", "leadership", "time management", "organization",
                "attention to detail", "multitasking", "flexibility", "adaptability",
                "customer service", "sales", "operations", "planning", "finance", "teaching",
                "training", "education", "learning", "development", "research", "analysis",
                "evaluation", "assessment", "review", "support", "assistance", "help",
                "service", "quality", "improvement", "management", "administration",
                "coordination", "supervision", "monitoring", "tracking", "reporting",
                "documentation", "compliance", "policy", "procedure", "process", "workflow",
                "standard", "guideline", "requirement", "specification", "criteria",
                "objective", "goal", "strategy", "plan", "approach", "method", "technique",
                "tool", "resource", "material", "equipment", "facility", "environment",
                "culture", "value", "principle", "ethic", "integrity", "honesty",
            ]),
            medical_terms: strings(&[
                "cancer", "diabetes", "heart disease", "stroke", "alzheimer", "dementia",
                "arthritis", "asthma", "pneumonia", "bronchitis", "infection", "virus",
                "bacteria", "disease", "illness", "syndrome", "disorder", "condition",
                "symptom", "treatment", "therapy", "medication", "drug", "medicine",
                "surgery", "operation", "procedure", "diagnosis", "prognosis",
                "breast cancer", "lung cancer", "skin cancer", "prostate cancer",
                "bladder cancer", "liver cancer", "kidney cancer", "brain cancer",
            ]),
            support_allowlist: strings(&[
                "support vector machines", "support engineering", "support documentation",
                "support systems", "support services", "support operations",
            ]),
            substitutions: pairs(&[
                ("javascript", "js"),
                ("typescript", "ts"),
                ("reactjs", "react"),
                ("react js", "react"),
                ("nodejs", "node.js"),
                ("node js", "node.js"),
                ("restful apis", "restful api"),
                ("api development", "api"),
                ("database design", "database"),
                ("sql server", "sql"),
                ("mysql", "sql"),
                ("postgresql", "sql"),
                ("postgres", "sql"),
                ("software development", "software engineering"),
                ("web development", "web dev"),
                ("frontend", "front-end"),
                ("backend", "back-end"),
                ("fullstack", "full-stack"),
                ("full stack", "full-stack"),
            ]),
            technical_keywords: strings(&[
                "python", "java", "javascript", "js", "typescript", "ts", "c++", "c#", "php",
                "ruby", "go", "rust", "scala", "kotlin", "react", "angular", "vue", "node.js",
                "django", "flask", "spring", "express", "laravel", "sql", "mysql",
                "postgresql", "mongodb", "redis", "elasticsearch", "database", "docker",
                "kubernetes", "git", "jenkins", "aws", "azure", "gcp", "linux", "unix", "api",
                "restful", "graphql", "microservices", "cloud", "blockchain", "ai",
                "machine learning", "ml", "software engineering", "computer science",
                "algorithm", "data structure", "testing", "debugging",
            ]),
            language_keywords: strings(&[
                "python", "javascript", "java", "typescript", "ruby", "c++", "c#", "go",
                "rust", "scala", "kotlin", "php",
            ]),
            framework_keywords: strings(&[
                "react", "angular", "vue", "django", "flask", "spring", "express", "laravel",
                "node.js",
            ]),
            markup_keywords: strings(&["sql", "html", "css", "graphql", "markdown"]),
            variations: default_variations(),
        }
    }
}

impl VocabularyData {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            SkillMatcherError::Vocabulary(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Compiled vocabulary consumed by the normalizer, gap analyzer, and
/// vector-space matcher
pub struct SkillVocabulary {
    data: VocabularyData,
    rejected: HashSet<String>,
    support_allowlist: HashSet<String>,
    tech_matcher: AhoCorasick,
}

impl SkillVocabulary {
    pub fn new() -> Result<Self> {
        Self::from_data(VocabularyData::default())
    }

    pub fn from_data(data: VocabularyData) -> Result<Self> {
        let mut rejected = HashSet::new();
        for list in [
            &data.noise_terms,
            &data.boilerplate_terms,
            &data.generic_terms,
            &data.medical_terms,
        ] {
            rejected.extend(list.iter().map(|s| s.to_lowercase()));
        }
        let support_allowlist: HashSet<String> = data
            .support_allowlist
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let tech_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&data.technical_keywords)
            .map_err(|e| {
                SkillMatcherError::Vocabulary(format!("failed to build technical matcher: {}", e))
            })?;

        Ok(Self {
            data,
            rejected,
            support_allowlist,
            tech_matcher,
        })
    }

    /// Load vocabulary data from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_data(VocabularyData::load(path)?)
    }

    pub fn version(&self) -> &str {
        &self.data.version
    }

    /// Validity filter for raw skill labels: rejects extraction noise,
    /// boilerplate, generic discriminators, and malformed fragments
    pub fn is_valid_skill(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();

        if lower.len() <= 2 {
            return false;
        }
        if self.rejected.contains(&lower) {
            return false;
        }
        // "support <word>" labels are usually fragments of "browser support" etc.
        if lower.starts_with("support ")
            && lower.split_whitespace().count() == 2
            && !self.support_allowlist.contains(&lower)
        {
            return false;
        }
        // Shape check: a skill label has at least one alphanumeric character
        // and is not a URL fragment
        if !lower.chars().any(|c| c.is_alphanumeric()) {
            return false;
        }
        if lower.starts_with("http") || lower.starts_with("www.") {
            return false;
        }

        true
    }

    /// Canonicalize a label: case-fold, trim, then apply the substitution
    /// table in order so variants collapse to one skill id
    pub fn canonicalize(&self, label: &str) -> String {
        let mut normalized = label.trim().to_lowercase();
        for (original, replacement) in &self.data.substitutions {
            if normalized.contains(original.as_str()) {
                normalized = normalized.replace(original.as_str(), replacement);
            }
        }
        normalized
    }

    /// Whether a canonical name is a technical/hard skill
    pub fn is_technical(&self, canonical: &str) -> bool {
        self.tech_matcher.is_match(canonical)
    }

    /// Coarse classification used for gap grouping and learning-time lookup
    pub fn classify(&self, canonical: &str) -> SkillClass {
        let contains_any =
            |keys: &[String]| keys.iter().any(|k| canonical.contains(k.as_str()));

        if contains_any(&self.data.language_keywords) {
            SkillClass::Language
        } else if contains_any(&self.data.framework_keywords) {
            SkillClass::Framework
        } else if contains_any(&self.data.markup_keywords) {
            SkillClass::MarkupOrQuery
        } else if self.is_technical(canonical) {
            SkillClass::Technical
        } else {
            SkillClass::SoftSkill
        }
    }

    /// Synonym/variation set for a canonical name, including the name itself
    /// and reverse mappings (if "python" lists "py", then "py" yields "python")
    pub fn variations(&self, canonical: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |v: &str| {
            if seen.insert(v.to_string()) {
                out.push(v.to_string());
            }
        };

        push(canonical);
        if let Some(direct) = self.data.variations.get(canonical) {
            for v in direct {
                push(v);
            }
        }
        for (key, values) in &self.data.variations {
            if values.iter().any(|v| v == canonical) {
                push(key);
            }
        }
        out
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

fn default_variations() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        ("python", &["python3", "python2", "py"]),
        ("js", &["ecmascript", "javascript"]),
        ("node.js", &["nodejs", "node", "node js"]),
        ("react", &["reactjs", "react.js"]),
        ("ts", &["typescript"]),
        ("sql", &["structured query language", "database", "postgres", "psql"]),
        ("docker", &["containerization", "docker container"]),
        ("git", &["version control", "git flow"]),
        ("aws", &["amazon web services", "amazon aws"]),
        ("css", &["cascading style sheets", "stylesheets"]),
        ("html", &["hypertext markup language", "markup"]),
        ("rest api", &["restful api", "rest", "api"]),
        ("graphql", &["graph ql", "query language"]),
        ("machine learning", &["ml", "artificial intelligence", "ai"]),
        ("artificial intelligence", &["ai", "machine learning", "ml"]),
        ("data science", &["data analysis", "analytics"]),
        ("nosql", &["non-relational database", "mongodb"]),
        ("mongodb", &["mongo", "nosql"]),
        ("kubernetes", &["k8s", "container orchestration"]),
        ("devops", &["dev ops", "operations"]),
        ("ci/cd", &["continuous integration", "continuous deployment"]),
        ("agile", &["scrum", "agile methodology"]),
        ("scrum", &["agile", "agile methodology"]),
    ];
    entries
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}
