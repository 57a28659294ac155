//! CLI interface for the skill matcher

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skill-matcher")]
#[command(about = "Skill-to-job matching, gap analysis, and industry alignment")]
#[command(
    long_about = "Match user skill profiles against a job corpus, analyze skill gaps with learning estimates, and track alignment against industry demand profiles"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON corpus file (users, jobs, industry profiles)
    #[arg(short = 'd', long, global = true)]
    pub corpus: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute ranked job matches for a user
    Match {
        /// User id from the corpus file
        user: String,

        /// Maximum matches to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Matching algorithm: basic or tfidf
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Show per-skill and per-metric detail
        #[arg(long)]
        detailed: bool,

        /// Persist the computed matches
        #[arg(long)]
        save: bool,
    },

    /// Analyze skill gaps between a user and one job
    Gaps {
        /// User id from the corpus file
        user: String,

        /// Job id from the corpus file
        job: String,
    },

    /// Recompute cached matches for every user, or one with --user
    Recompute {
        /// Recompute a single user instead of all
        #[arg(short, long)]
        user: Option<String>,

        /// Matching algorithm: basic or tfidf
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Matches kept per user for this run
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Score a user against every industry profile
    Align {
        /// User id from the corpus file
        user: String,
    },

    /// Show a user's alignment history grouped by day
    Timeline {
        /// User id from the corpus file
        user: String,

        /// How many days of history
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// How many industries to track
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Delete cached matches older than the given age
    Cleanup {
        /// Age threshold in days
        #[arg(long)]
        days: Option<i64>,
    },

    /// Show match statistics for a user and the whole store
    Stats {
        /// User id from the corpus file
        user: String,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}
