use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{RawProfile, RawRequirement};
use crate::services::prompts;

/// Errors that can occur when calling the extraction model
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned no text content")]
    EmptyContent,

    #[error("Invalid response format: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

/// Gemini `generateContent` client turning document text into raw records
///
/// Handles retries for rate limiting and transient server errors; the
/// matching engine never sees partial or retried state.
pub struct ExtractionClient {
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    backoff: Duration,
    client: Client,
}

impl ExtractionClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ExtractionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_retries,
            backoff: Duration::from_millis(500),
            client,
        })
    }

    /// Override the initial retry delay (doubled after every attempt)
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract candidate fields from CV text
    pub async fn extract_profile(&self, cv_text: &str) -> Result<RawProfile, ExtractionError> {
        self.extract(&prompts::profile_prompt(cv_text)).await
    }

    /// Extract requirement fields from job description text
    pub async fn extract_requirement(
        &self,
        job_text: &str,
    ) -> Result<RawRequirement, ExtractionError> {
        self.extract(&prompts::requirement_prompt(job_text)).await
    }

    async fn extract<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, ExtractionError> {
        let text = self.generate(prompt).await?;
        Ok(serde_json::from_str(strip_code_fences(&text))?)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let parsed: GenerateResponse = response.json().await?;
                return parsed
                    .text()
                    .map(str::to_string)
                    .ok_or(ExtractionError::EmptyContent);
            }

            let retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < self.max_retries {
                let delay = self.backoff * 2u32.saturating_pow(attempt);
                tracing::warn!(
                    "Extraction request failed with {}, retrying in {:?} (attempt {}/{})",
                    status,
                    delay,
                    attempt + 1,
                    self.max_retries
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ExtractionError::RateLimited { retries: attempt });
            }

            let message = response.text().await.unwrap_or_default();
            tracing::error!("Extraction API error {}: {}", status, message);
            return Err(ExtractionError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
    }
}

/// Remove a surrounding markdown code fence, if the model added one
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
