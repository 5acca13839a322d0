use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::normalizer::NormalizedToken;
use crate::models::report::{Interpretation, MatchResult};

/// Flat, renderer-facing view of a [`MatchResult`]
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport<'a> {
    pub cv_document_id: &'a str,
    pub job_document_id: &'a str,
    pub final_score: f64,
    pub percentage: u8,
    pub interpretation: Interpretation,
    pub skills_score: f64,
    pub education_score: f64,
    pub experience_score: f64,
    pub matched_skills: Vec<&'a NormalizedToken>,
    pub missing_skills: Vec<&'a NormalizedToken>,
    pub matched_education: Vec<&'a NormalizedToken>,
    pub missing_education: Vec<&'a NormalizedToken>,
    pub matched_experience: Vec<&'a NormalizedToken>,
    pub missing_experience: Vec<&'a NormalizedToken>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> From<&'a MatchResult> for MatchReport<'a> {
    fn from(result: &'a MatchResult) -> Self {
        Self {
            cv_document_id: &result.cv_document_id,
            job_document_id: &result.job_document_id,
            final_score: result.final_score,
            percentage: result.percentage(),
            interpretation: result.interpretation(),
            skills_score: result.skills.raw,
            education_score: result.education.raw,
            experience_score: result.experience.raw,
            matched_skills: result.skills.matched.iter().collect(),
            missing_skills: result.skills.missing.iter().collect(),
            matched_education: result.education.matched.iter().collect(),
            missing_education: result.education.missing.iter().collect(),
            matched_experience: result.experience.matched.iter().collect(),
            missing_experience: result.experience.missing.iter().collect(),
            generated_at: result.generated_at,
        }
    }
}

pub fn to_json_value(result: &MatchResult) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(MatchReport::from(result))
}

pub fn to_json_string(result: &MatchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&MatchReport::from(result))
}
