//! Gemini backend
//!
//! Sends one `generateContent` request with the product image inlined as
//! base64 and a text prompt built from the feature notes and audience.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::{DescriptionGenerator, GenerationError};
use crate::config::Config;
use crate::media::ImageFile;

/// Gemini backend over the public REST API
pub struct GeminiGenerator {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// API base, e.g. https://generativelanguage.googleapis.com/v1beta
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl DescriptionGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn generate(
        &self,
        image: &ImageFile,
        features: &str,
        audience: &str,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let body = request_body(image, features, audience);

        tracing::debug!("POST {} ({} byte image)", self.url(), image.len());

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if status.is_success() {
            parse_success(&text)
        } else {
            Err(parse_failure(status.as_u16(), &text))
        }
    }
}

/// Instruction sent alongside the image
pub fn build_prompt(features: &str, audience: &str) -> String {
    let features = features.trim();
    let audience = audience.trim();

    let mut prompt = String::from(
        "You are an expert e-commerce copywriter. Write a compelling product description \
         for the product shown in the image.\n",
    );

    if !features.is_empty() {
        prompt.push_str("\nKey features:\n");
        for line in features.lines().map(str::trim).filter(|l| !l.is_empty()) {
            prompt.push_str("- ");
            prompt.push_str(line);
            prompt.push('\n');
        }
    }

    if !audience.is_empty() {
        prompt.push_str("\nTarget audience: ");
        prompt.push_str(audience);
        prompt.push('\n');
    }

    prompt.push_str(
        "\nStart with a catchy headline, follow with two short paragraphs and finish \
         with a call to action. Return plain text only.",
    );
    prompt
}

#[derive(Serialize, Debug)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Debug)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

fn request_body(image: &ImageFile, features: &str, audience: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Inline {
                    inline_data: InlineData {
                        mime_type: image.mime().to_string(),
                        data: general_purpose::STANDARD.encode(image.bytes()),
                    },
                },
                Part::Text {
                    text: build_prompt(features, audience),
                },
            ],
        }],
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn parse_success(body: &str) -> Result<String, GenerationError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::Service(format!("Unreadable response: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Service(format!("The request was blocked ({})", reason)));
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

fn parse_failure(status: u16, body: &str) -> GenerationError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.trim().is_empty() => {
            GenerationError::Service(envelope.error.message)
        }
        _ => GenerationError::Status { status },
    }
}
