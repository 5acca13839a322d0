// Model exports
pub mod domain;
pub mod report;
pub mod requests;
pub mod responses;

pub use domain::{
    EducationEntry, ExperienceEntry, ExtractedProfile, ExtractedRequirement, RawEducation,
    RawExperience, RawProfile, RawRequiredEducation, RawRequiredExperience, RawRequirement,
    RequiredEducation, RequiredExperience, Tenure, YearMonth,
};
pub use report::{Category, CategoryScore, Interpretation, MatchResult, ScoringWeights};
pub use requests::{DocumentMatchRequest, MatchRequest, PdfMatchForm, ReportFormat};
pub use responses::{ErrorResponse, HealthResponse};
