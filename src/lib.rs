//! CV Job Matcher - deterministic CV to job description compatibility scoring
//!
//! The [`core`] engine normalizes extracted skills, education and experience,
//! scores each category independently and combines them with fixed policy
//! weights. Everything around it (AI extraction, HTTP, report rendering) lives
//! in the outer modules and only consumes the engine's [`MatchResult`].

pub mod config;
pub mod core;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{aggregate, normalize, MatchContext, MatchError, Matcher, NormalizedToken, Normalizer};
pub use models::{CategoryScore, ExtractedProfile, ExtractedRequirement, MatchResult, ScoringWeights};
