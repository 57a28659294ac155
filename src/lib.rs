//! Skill-to-job matching, gap analysis, and industry alignment
//!
//! The engine consumes skill assertions and job postings through the
//! repository traits in [`store`], normalizes both sides with a shared
//! vocabulary, and produces ranked matches, prioritized skill gaps, and
//! industry alignment timelines.

pub mod alignment;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod normalize;
pub mod output;
pub mod store;
pub mod vocabulary;

pub use config::Config;
pub use error::{Result, SkillMatcherError};
