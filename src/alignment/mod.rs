//! Industry alignment: scoring a user's skills against industry demand
//! profiles and reading the history back as a timeline

pub mod calculator;
pub mod timeline;

pub use calculator::AlignmentCalculator;
pub use timeline::{AlignmentTimeline, IndustryPoint, TimelinePoint};
