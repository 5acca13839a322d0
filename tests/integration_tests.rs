// Integration tests for the CV job matcher

use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};
use cv_job_matcher::core::{AliasTable, MatchContext, MatchError, Matcher};
use cv_job_matcher::models::{RawProfile, RawRequirement};
use cv_job_matcher::render::{render_pdf, render_text, to_json_value, ReportWriter};
use cv_job_matcher::routes::{self, AppState};
use cv_job_matcher::services::ExtractionClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn profile_json() -> Value {
    json!({
        "name": "Jane Doe",
        "skills": ["Python", "SQL", "JS", "Excel"],
        "education": [
            {"degree": "B.Sc.", "field": "Computer Science", "institution": "State University"}
        ],
        "experience": [
            {"role": "Data Analyst", "organization": "Acme Corp", "start": "2022-01", "end": "2023-07"},
            {"role": "Barista", "organization": "Coffee House", "duration_months": 24}
        ]
    })
}

fn requirement_json() -> Value {
    json!({
        "required_skills": ["python", "sql", "javascript", "java"],
        "required_education": {"degree": "Master's degree", "fields": ["computer science"]},
        "required_experience": {"description": "2+ years of experience", "domains": ["data"]}
    })
}

fn matcher() -> Matcher {
    let aliases = AliasTable::from_toml_str(
        r#"
        [aliases]
        javascript = ["js"]
        "#,
    )
    .unwrap();
    Matcher::new(Arc::new(aliases))
}

fn state(extractor: Option<Arc<ExtractionClient>>) -> AppState {
    AppState {
        matcher: matcher(),
        extractor,
        writer: None,
    }
}

fn model_reply(record: Value) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": record.to_string()}]}}]}).to_string()
}

/// Gemini stand-in answering the profile and the requirement prompt
async fn extraction_server() -> (mockito::ServerGuard, Vec<mockito::Mock>) {
    let mut server = mockito::Server::new_async().await;
    let profile = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_body(mockito::Matcher::Regex("Analyze the following CV".to_string()))
        .with_status(200)
        .with_body(model_reply(profile_json()))
        .create_async()
        .await;
    let requirement = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_body(mockito::Matcher::Regex("Analyze the following job description".to_string()))
        .with_status(200)
        .with_body(model_reply(requirement_json()))
        .create_async()
        .await;
    (server, vec![profile, requirement])
}

fn extractor_for(server: &mockito::ServerGuard) -> Arc<ExtractionClient> {
    let client = ExtractionClient::new(
        server.url(),
        "key".to_string(),
        "gemini-test".to_string(),
        Duration::from_secs(5),
        0,
    )
    .unwrap();
    Arc::new(client)
}

const BOUNDARY: &str = "----cvmatchboundary";

/// Build a multipart/form-data body from `(field, file name, bytes)` parts
fn multipart_body(files: &[(&str, &str, &[u8])], texts: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (field, value) in texts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\nContent-Type: text/plain\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/match/pdf")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

/// A small real PDF whose text layer is the given result's report
fn sample_pdf(cv_document_id: &str) -> Vec<u8> {
    let profile: RawProfile = serde_json::from_value(profile_json()).unwrap();
    let requirement: RawRequirement = serde_json::from_value(requirement_json()).unwrap();
    let result = matcher()
        .evaluate_raw(profile, requirement, MatchContext::new(cv_document_id, "job", Utc::now()))
        .unwrap();
    render_pdf(&result).unwrap()
}

#[actix_web::test]
async fn test_integration_end_to_end_matching() {
    let profile: RawProfile = serde_json::from_value(profile_json()).unwrap();
    let requirement: RawRequirement = serde_json::from_value(requirement_json()).unwrap();
    let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let result = matcher()
        .evaluate_raw(profile, requirement, MatchContext::new("cv-1", "job-1", generated_at))
        .unwrap();

    // 3 of 4 skills, bachelor vs master with matching field, 18 of 24 relevant months
    assert!((result.skills.raw - 0.75).abs() < 1e-9);
    assert!((result.education.raw - 0.75).abs() < 1e-9);
    assert!((result.experience.raw - 0.75).abs() < 1e-9);
    assert!((result.final_score - 0.75).abs() < 1e-9);
    assert_eq!(result.percentage(), 75);

    let report = to_json_value(&result).unwrap();
    assert_eq!(report["missing_skills"], json!(["java"]));
    assert_eq!(report["matched_education"], json!(["computer science"]));
    assert_eq!(report["missing_education"], json!(["master"]));
    assert_eq!(report["matched_experience"], json!(["data"]));
    assert_eq!(report["missing_experience"], json!(["24 months"]));

    let text = render_text(&result);
    assert!(text.contains("Overall Match Score: 75/100"));
}

#[actix_web::test]
async fn test_malformed_profile_fails_before_scoring() {
    let mut profile = profile_json();
    profile.as_object_mut().unwrap().remove("education");
    let profile: RawProfile = serde_json::from_value(profile).unwrap();
    let requirement: RawRequirement = serde_json::from_value(requirement_json()).unwrap();

    let err = matcher()
        .evaluate_raw(profile, requirement, MatchContext::new("cv", "job", Utc::now()))
        .unwrap_err();

    assert!(matches!(err, MatchError::MalformedInput { ref field, .. } if field == "education"));
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["extraction_enabled"], false);
}

#[actix_web::test]
async fn test_match_endpoint_returns_report() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "cv_document_id": "cv-9",
            "profile": profile_json(),
            "requirement": requirement_json()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cv_document_id"], "cv-9");
    assert!(body["job_document_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["skills_score"], json!(0.75));
    assert_eq!(body["matched_skills"], json!(["javascript", "python", "sql"]));
}

#[actix_web::test]
async fn test_match_endpoint_text_format() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "profile": profile_json(),
            "requirement": requirement_json(),
            "format": "text"
        }))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.starts_with("CV and Job Description Match Report"));
}

#[actix_web::test]
async fn test_match_endpoint_rejects_malformed_record() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "profile": profile_json(),
            "requirement": {"required_skills": ["rust"]}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("required_education"));
}

#[actix_web::test]
async fn test_invalid_json_uses_error_shape() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_documents_endpoint_without_extractor() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match/documents")
        .set_json(json!({"cv_text": "cv", "job_text": "job"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 503);
}

#[actix_web::test]
async fn test_documents_endpoint_with_extractor() {
    let (server, _mocks) = extraction_server().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(Some(extractor_for(&server)))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match/documents")
        .set_json(json!({
            "cv_document_id": "cv.pdf",
            "job_document_id": "job.pdf",
            "cv_text": "Jane Doe, data analyst...",
            "job_text": "We are hiring a data engineer..."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cv_document_id"], "cv.pdf");
    assert_eq!(body["job_document_id"], "job.pdf");
    assert_eq!(body["missing_skills"], json!(["java"]));
}

#[actix_web::test]
async fn test_shipped_alias_table_helps_domain_and_field_matching() {
    let aliases = AliasTable::load("config/aliases.toml").unwrap();
    let with_aliases = Matcher::new(Arc::new(aliases));

    let profile: RawProfile = serde_json::from_value(json!({
        "name": "Sam Lee",
        "skills": ["Python", "K8s"],
        "education": [{"degree": "BSc", "field": "CS and Mathematics", "institution": "Tech U"}],
        "experience": [{"role": "ML Engineer", "organization": "Acme", "duration_months": 30}]
    }))
    .unwrap();
    let requirement: RawRequirement = serde_json::from_value(json!({
        "required_skills": ["python", "kubernetes"],
        "required_education": {"degree": "Bachelor", "fields": ["Computer Science"]},
        "required_experience": {"months": 24, "domains": ["machine learning"]}
    }))
    .unwrap();

    let plain = Matcher::without_aliases()
        .evaluate_raw(profile.clone(), requirement.clone(), MatchContext::new("cv", "job", Utc::now()))
        .unwrap();
    let aliased = with_aliases
        .evaluate_raw(profile, requirement, MatchContext::new("cv", "job", Utc::now()))
        .unwrap();

    assert_eq!(aliased.skills.raw, 1.0);
    assert_eq!(aliased.education.raw, 1.0);
    assert_eq!(aliased.experience.raw, 1.0);
    assert!(aliased.final_score >= plain.final_score);
    assert!(aliased.experience.matched.iter().any(|t| t.as_str() == "machine learning"));
}

#[actix_web::test]
async fn test_match_endpoint_persists_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut app_state = state(None);
    app_state.writer = Some(ReportWriter::new(dir.path()));

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "cv_document_id": "cv-42",
            "profile": profile_json(),
            "requirement": requirement_json()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let mut extensions: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.to_string_lossy().contains("cv-42"))
        .filter_map(|path| path.extension().map(|e| e.to_string_lossy().into_owned()))
        .collect();
    extensions.sort();
    assert_eq!(extensions, vec!["json", "pdf", "txt"]);
}

#[actix_web::test]
async fn test_pdf_endpoint_rejects_non_pdf_upload() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .app_data(routes::multipart_config())
            .configure(routes::configure_routes),
    )
    .await;

    let pdf = sample_pdf("cv");
    let body = multipart_body(
        &[("cv_file", "resume.docx", &b"PK\x03\x04"[..]), ("job_file", "job.pdf", pdf.as_slice())],
        &[],
    );
    let resp = test::call_service(&app, multipart_request(body).to_request()).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("resume.docx"));
}

#[actix_web::test]
async fn test_pdf_endpoint_without_extractor() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(None)))
            .app_data(routes::multipart_config())
            .configure(routes::configure_routes),
    )
    .await;

    let pdf = sample_pdf("cv");
    let body = multipart_body(
        &[("cv_file", "cv.pdf", pdf.as_slice()), ("job_file", "job.pdf", pdf.as_slice())],
        &[],
    );
    let resp = test::call_service(&app, multipart_request(body).to_request()).await;

    assert_eq!(resp.status().as_u16(), 503);
}

#[actix_web::test]
async fn test_pdf_endpoint_extracts_and_scores() {
    let (server, _mocks) = extraction_server().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(Some(extractor_for(&server)))))
            .app_data(routes::multipart_config())
            .configure(routes::configure_routes),
    )
    .await;

    let cv = sample_pdf("previous-cv");
    let job = sample_pdf("previous-job");
    let body = multipart_body(
        &[("cv_file", "jane_doe.pdf", cv.as_slice()), ("job_file", "data_role.pdf", job.as_slice())],
        &[("job_document_id", "job-7")],
    );
    let resp = test::call_service(&app, multipart_request(body).to_request()).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cv_document_id"], "jane_doe.pdf");
    assert_eq!(body["job_document_id"], "job-7");
    assert_eq!(body["missing_skills"], json!(["java"]));
}
