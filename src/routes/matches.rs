use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::core::{MatchContext, MatchError, Matcher};
use crate::models::{
    DocumentMatchRequest, ErrorResponse, HealthResponse, MatchRequest, MatchResult, PdfMatchForm,
    ReportFormat,
};
use crate::render::{render_text, MatchReport, ReportWriter};
use crate::services::{pdf, ExtractionClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub extractor: Option<Arc<ExtractionClient>>,
    pub writer: Option<ReportWriter>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match", web::post().to(match_records))
        .route("/match/documents", web::post().to(match_documents))
        .route("/match/pdf", web::post().to(match_pdfs));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn match_error_response(err: MatchError) -> HttpResponse {
    use actix_web::http::StatusCode;

    match err {
        MatchError::MalformedInput { .. } => {
            tracing::info!("Rejected malformed extraction record: {}", err);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "Malformed input", err.to_string())
        }
        MatchError::IncompleteScore(_) => {
            tracing::error!("Scoring did not complete: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Incomplete score", err.to_string())
        }
    }
}

fn document_id(id: &Option<String>) -> String {
    id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Persist the result when an output directory is configured, then render it
async fn respond(state: &AppState, result: MatchResult, format: ReportFormat) -> HttpResponse {
    if let Some(writer) = state.writer.clone() {
        let dir = writer.dir().to_path_buf();
        let snapshot = result.clone();
        match web::block(move || writer.write(&snapshot)).await {
            Ok(Ok(written)) => tracing::debug!(
                "Wrote reports to {:?}, {:?} and {:?}",
                written.json,
                written.text,
                written.pdf
            ),
            Ok(Err(e)) => tracing::warn!("Failed to persist reports in {:?}: {}", dir, e),
            Err(e) => tracing::warn!("Report writer did not complete for {:?}: {}", dir, e),
        }
    }

    tracing::info!(
        "Matched cv {} against job {}: score {}/100",
        result.cv_document_id,
        result.job_document_id,
        result.percentage()
    );

    match format {
        ReportFormat::Json => HttpResponse::Ok().json(MatchReport::from(&result)),
        ReportFormat::Text => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(render_text(&result)),
    }
}

fn extraction_unavailable() -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
        "Extraction unavailable",
        "No extraction API key is configured".to_string(),
    )
}

/// Extract both documents with the AI collaborator, then score them
async fn extract_and_match(
    state: &AppState,
    extractor: &ExtractionClient,
    cv_text: &str,
    job_text: &str,
    context: MatchContext,
    format: ReportFormat,
) -> HttpResponse {
    tracing::info!(
        "Extracting cv {} ({} chars) and job {} ({} chars) with {}",
        context.cv_document_id,
        cv_text.len(),
        context.job_document_id,
        job_text.len(),
        extractor.model()
    );

    let extracted = tokio::try_join!(
        extractor.extract_profile(cv_text),
        extractor.extract_requirement(job_text),
    );
    let (profile, requirement) = match extracted {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Extraction failed for cv {}: {}", context.cv_document_id, e);
            return error_response(
                actix_web::http::StatusCode::BAD_GATEWAY,
                "Extraction failed",
                e.to_string(),
            );
        }
    };

    match state.matcher.evaluate_raw(profile, requirement, context) {
        Ok(result) => respond(state, result, format).await,
        Err(e) => match_error_response(e),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        extraction_enabled: state.extractor.is_some(),
    })
}

/// Score already-extracted records
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "cv_document_id": "string",
///   "job_document_id": "string",
///   "profile": { "name": "...", "skills": [], "education": [], "experience": [] },
///   "requirement": { "required_skills": [], "required_education": {}, "required_experience": {} },
///   "format": "json|text"
/// }
/// ```
async fn match_records(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    let req = req.into_inner();
    let context = MatchContext::new(
        document_id(&req.cv_document_id),
        document_id(&req.job_document_id),
        Utc::now(),
    );

    match state.matcher.evaluate_raw(req.profile, req.requirement, context) {
        Ok(result) => respond(&state, result, req.format).await,
        Err(e) => match_error_response(e),
    }
}

/// Extract both documents with the AI collaborator, then score them
///
/// POST /api/v1/match/documents
///
/// Request body:
/// ```json
/// {
///   "cv_text": "string",
///   "job_text": "string",
///   "format": "json|text"
/// }
/// ```
async fn match_documents(
    state: web::Data<AppState>,
    req: web::Json<DocumentMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for document match request: {:?}", errors);
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    let Some(extractor) = state.extractor.clone() else {
        return extraction_unavailable();
    };

    let req = req.into_inner();
    let context = MatchContext::new(
        document_id(&req.cv_document_id),
        document_id(&req.job_document_id),
        Utc::now(),
    );

    extract_and_match(&state, &extractor, &req.cv_text, &req.job_text, context, req.format).await
}

/// Read the text of two uploaded PDFs, then extract and score them
///
/// POST /api/v1/match/pdf
///
/// Multipart form fields: `cv_file`, `job_file` (PDF uploads) and the
/// optional text fields `cv_document_id`, `job_document_id`, `format`.
/// Document ids default to the uploaded file names.
async fn match_pdfs(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<PdfMatchForm>,
) -> impl Responder {
    use actix_web::http::StatusCode;

    let format = form.format();
    let cv_name = form.cv_file.file_name.clone().unwrap_or_else(|| "cv_file".to_string());
    let job_name = form.job_file.file_name.clone().unwrap_or_else(|| "job_file".to_string());

    let checked = pdf::check_pdf(&cv_name, &form.cv_file.data)
        .and_then(|_| pdf::check_pdf(&job_name, &form.job_file.data));
    if let Err(e) = checked {
        tracing::info!("Rejected upload: {}", e);
        return error_response(StatusCode::BAD_REQUEST, "Invalid upload", e.to_string());
    }

    let Some(extractor) = state.extractor.clone() else {
        return extraction_unavailable();
    };

    let context = MatchContext::new(
        form.cv_document_id.map(|id| id.0).unwrap_or_else(|| cv_name.clone()),
        form.job_document_id.map(|id| id.0).unwrap_or_else(|| job_name.clone()),
        Utc::now(),
    );

    let (cv_data, job_data) = (form.cv_file.data, form.job_file.data);
    let texts = web::block(move || -> Result<(String, String), pdf::PdfError> {
        Ok((
            pdf::extract_text(&cv_name, &cv_data)?,
            pdf::extract_text(&job_name, &job_data)?,
        ))
    })
    .await;

    let (cv_text, job_text) = match texts {
        Ok(Ok(texts)) => texts,
        Ok(Err(e)) => {
            tracing::info!("Could not read uploaded PDF: {}", e);
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Unreadable PDF", e.to_string());
        }
        Err(e) => {
            tracing::error!("PDF text extraction did not complete: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF extraction failed",
                e.to_string(),
            );
        }
    };

    extract_and_match(&state, &extractor, &cv_text, &job_text, context, format).await
}
