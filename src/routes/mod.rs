// Route exports
pub mod matches;

use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};

use crate::models::ErrorResponse;

pub use matches::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure),
    );
}

/// Upper bound for a whole PDF upload request, both files included
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Multipart limits for PDF uploads; files are buffered in memory
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MAX_UPLOAD_BYTES)
        .memory_limit(MAX_UPLOAD_BYTES)
        .error_handler(handle_multipart_error)
}

/// JSON error for payloads that fail to deserialize
#[derive(Debug)]
pub struct JsonError(ErrorResponse);

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle multipart upload errors
pub fn handle_multipart_error(err: MultipartError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Multipart payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse {
        error: "invalid_upload".to_string(),
        message: format!("Invalid upload: {}", err),
        status_code: 400,
    })
    .into()
}
