// Report renderers
pub mod json;
pub mod pdf;
pub mod text;

pub use json::{to_json_string, to_json_value, MatchReport};
pub use pdf::render_pdf;
pub use text::render_text;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::report::MatchResult;

/// Errors that can occur while persisting reports
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF rendering error: {0}")]
    Pdf(String),
}

/// Paths of the files written for one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReports {
    pub json: PathBuf,
    pub text: PathBuf,
    pub pdf: PathBuf,
}

/// Persists rendered reports into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `match_result_<timestamp>_<cv id>.{json,txt,pdf}`
    pub fn write(&self, result: &MatchResult) -> Result<WrittenReports, RenderError> {
        std::fs::create_dir_all(&self.dir)?;

        let stem = format!(
            "match_result_{}_{}",
            result.generated_at.format("%Y%m%d_%H%M%S"),
            sanitize(&result.cv_document_id)
        );
        let json = self.dir.join(format!("{stem}.json"));
        let text = self.dir.join(format!("{stem}.txt"));
        let pdf = self.dir.join(format!("{stem}.pdf"));

        std::fs::write(&json, to_json_string(result)?)?;
        std::fs::write(&text, render_text(result))?;
        std::fs::write(&pdf, render_pdf(result)?)?;

        Ok(WrittenReports { json, text, pdf })
    }
}

/// Keep document ids usable as file name fragments
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
