// Service exports
pub mod extraction;
pub mod pdf;
pub mod prompts;

pub use extraction::{strip_code_fences, ExtractionClient, ExtractionError};
pub use pdf::{check_pdf, extract_text, PdfError};
