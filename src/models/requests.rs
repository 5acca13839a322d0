use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{RawProfile, RawRequirement};

/// Output format of a match report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

/// Request to score already-extracted records
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub cv_document_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub job_document_id: Option<String>,
    pub profile: RawProfile,
    pub requirement: RawRequirement,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Request to extract and score raw document text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentMatchRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub cv_document_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub job_document_id: Option<String>,
    #[validate(length(min = 1, max = 200000))]
    pub cv_text: String,
    #[validate(length(min = 1, max = 200000))]
    pub job_text: String,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Multipart upload of a CV and a job description as PDF files
#[derive(Debug, MultipartForm)]
pub struct PdfMatchForm {
    #[multipart(limit = "10MB")]
    pub cv_file: Bytes,
    #[multipart(limit = "10MB")]
    pub job_file: Bytes,
    pub cv_document_id: Option<Text<String>>,
    pub job_document_id: Option<Text<String>>,
    pub format: Option<Text<ReportFormat>>,
}

impl PdfMatchForm {
    pub fn format(&self) -> ReportFormat {
        self.format.as_ref().map(|f| f.0).unwrap_or_default()
    }
}
