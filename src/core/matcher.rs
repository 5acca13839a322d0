use std::sync::Arc;

use crate::core::{
    aggregator::{aggregate, MatchContext},
    education::{normalize_education, normalize_required_education, score_education},
    error::MatchError,
    experience::{normalize_experience, normalize_required_experience, score_experience},
    normalizer::{AliasTable, Normalizer},
    skills::score_skills,
};
use crate::models::{ExtractedProfile, ExtractedRequirement, MatchResult, RawProfile, RawRequirement};

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Boundary validation of the extracted records
/// 2. Normalization of skills, education and experience
/// 3. Independent category scoring
/// 4. Weighted aggregation
///
/// Holds only the read-only alias table, so one instance can be cloned into
/// every worker and used concurrently.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    normalizer: Normalizer,
}

impl Matcher {
    pub fn new(aliases: Arc<AliasTable>) -> Self {
        Self {
            normalizer: Normalizer::new(aliases),
        }
    }

    pub fn without_aliases() -> Self {
        Self::default()
    }

    /// Validate raw extraction output, then score it
    ///
    /// Fails with [`MatchError::MalformedInput`] before any scoring happens
    /// if either record lacks a required field.
    pub fn evaluate_raw(
        &self,
        profile: RawProfile,
        requirement: RawRequirement,
        context: MatchContext,
    ) -> Result<MatchResult, MatchError> {
        let profile = ExtractedProfile::try_from(profile)?;
        let requirement = ExtractedRequirement::try_from(requirement)?;
        self.evaluate(&profile, &requirement, context)
    }

    /// Score a validated profile against a validated requirement
    pub fn evaluate(
        &self,
        profile: &ExtractedProfile,
        requirement: &ExtractedRequirement,
        context: MatchContext,
    ) -> Result<MatchResult, MatchError> {
        let normalizer = &self.normalizer;

        // Stage 1: Skills
        let skills = score_skills(
            &normalizer.normalize_all(&profile.skills),
            &normalizer.normalize_all(&requirement.required_skills),
        );

        // Stage 2: Education
        let education = score_education(
            &normalize_education(normalizer, &profile.education),
            &normalize_required_education(normalizer, &requirement.education),
        );

        // Stage 3: Experience, ongoing roles measured up to the report time
        let experience = score_experience(
            &normalize_experience(normalizer, &profile.experience, context.generated_at),
            &normalize_required_experience(normalizer, &requirement.experience),
        );

        aggregate(Some(skills), Some(education), Some(experience), context)
    }
}
