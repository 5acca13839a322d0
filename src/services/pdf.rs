use thiserror::Error;

/// Errors that can occur when reading an uploaded PDF
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("{0} must be a PDF file")]
    NotPdf(String),

    #[error("Failed to read PDF {name}: {message}")]
    Unreadable { name: String, message: String },

    #[error("No text could be extracted from {0}")]
    NoText(String),
}

/// Reject uploads that are not PDFs by name and by header
pub fn check_pdf(name: &str, bytes: &[u8]) -> Result<(), PdfError> {
    let has_extension = name.to_lowercase().ends_with(".pdf");
    if !has_extension || !bytes.starts_with(b"%PDF-") {
        return Err(PdfError::NotPdf(name.to_string()));
    }
    Ok(())
}

/// Extract the text layer of an uploaded PDF
///
/// CPU bound; call it from a blocking context.
pub fn extract_text(name: &str, bytes: &[u8]) -> Result<String, PdfError> {
    check_pdf(name, bytes)?;

    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError::Unreadable {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PdfError::NoText(name.to_string()));
    }
    Ok(text.to_string())
}
