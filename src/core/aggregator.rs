use chrono::{DateTime, Utc};

use crate::core::error::MatchError;
use crate::models::report::{Category, CategoryScore, MatchResult, ScoringWeights};

/// Identifies the comparison a result belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    pub cv_document_id: String,
    pub job_document_id: String,
    pub generated_at: DateTime<Utc>,
}

impl MatchContext {
    pub fn new(
        cv_document_id: impl Into<String>,
        job_document_id: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cv_document_id: cv_document_id.into(),
            job_document_id: job_document_id.into(),
            generated_at,
        }
    }
}

/// Weighted linear combination of category scores, clamped to [0, 1]
pub fn weighted_score(
    weights: &ScoringWeights,
    skills: &CategoryScore,
    education: &CategoryScore,
    experience: &CategoryScore,
) -> f64 {
    let total = weights.skills * skills.raw
        + weights.education * education.raw
        + weights.experience * experience.raw;

    total.max(0.0).min(1.0)
}

fn require(score: Option<CategoryScore>, category: Category) -> Result<CategoryScore, MatchError> {
    score
        .filter(|s| s.category == category)
        .ok_or(MatchError::IncompleteScore(category))
}

/// Combine the three category scores into a final result under the fixed
/// scoring policy
///
/// A missing (or misfiled) category is reported as
/// [`MatchError::IncompleteScore`] rather than counted as zero.
pub fn aggregate(
    skills: Option<CategoryScore>,
    education: Option<CategoryScore>,
    experience: Option<CategoryScore>,
    context: MatchContext,
) -> Result<MatchResult, MatchError> {
    let skills = require(skills, Category::Skills)?;
    let education = require(education, Category::Education)?;
    let experience = require(experience, Category::Experience)?;

    let final_score = weighted_score(&ScoringWeights::POLICY, &skills, &education, &experience);

    Ok(MatchResult {
        final_score,
        skills,
        education,
        experience,
        generated_at: context.generated_at,
        cv_document_id: context.cv_document_id,
        job_document_id: context.job_document_id,
    })
}
