use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::AiAnalysis;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

// Shown when the analysis cannot be produced, whatever the cause.
pub const FALLBACK_LEGAL_ANALYSIS: &str = "Não foi possível realizar a análise jurídica no \
     momento. Por favor, consulte o guia oficial da Lei do Aprendiz (10.097/2000).";

// --- Refiner trait ---

// Refinement is best-effort by contract: implementations must always come
// back with something usable, falling back to the raw description.
pub trait Refiner {
    fn refine(&self, description: &str, reason: &str) -> AiAnalysis;
}

pub fn fallback_analysis(description: &str) -> AiAnalysis {
    AiAnalysis {
        refined_text: description.to_string(),
        legal_analysis: FALLBACK_LEGAL_ANALYSIS.to_string(),
    }
}

// --- Gemini refiner ---

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

pub struct GeminiRefiner {
    api_key: Option<String>,
    model: String,
    client: reqwest::blocking::Client,
}

impl GeminiRefiner {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn request_analysis(&self, description: &str, reason: &str) -> Result<AiAnalysis> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("no AI key configured"))?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(description, reason),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_API_URL, self.model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .context("failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Gemini API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let api_response: GenerateResponse = response
            .json()
            .context("failed to parse Gemini API response")?;

        let text = api_response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| anyhow!("no candidate text in Gemini API response"))?;

        analysis_from_candidate_text(text, description)
    }
}

impl Refiner for GeminiRefiner {
    fn refine(&self, description: &str, reason: &str) -> AiAnalysis {
        match self.request_analysis(description, reason) {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "refinement unavailable, using fallback");
                fallback_analysis(description)
            }
        }
    }
}

// --- Helpers ---

fn build_prompt(description: &str, reason: &str) -> String {
    format!(
        "Analise a seguinte manifestação de um jovem aprendiz sobre \"{reason}\": \
         \"{description}\". Refine o texto para torná-lo profissional e claro. Forneça \
         também uma análise jurídica baseada na Lei 10.097/2000 (Lei do Aprendiz)."
    )
}

// Structured-output schema: exactly the two fields, both required.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "refinedText": { "type": "STRING" },
            "legalAnalysis": { "type": "STRING" }
        },
        "required": ["refinedText", "legalAnalysis"]
    })
}

// The model answers with a JSON document in the candidate text. Both fields
// must come back non-empty; a partial document counts as a failed call and
// resolves to the full fallback pair, never to a mix of the two.
fn analysis_from_candidate_text(text: &str, description: &str) -> Result<AiAnalysis> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("candidate text is not valid JSON")?;
    match (
        non_empty_str(&value, "refinedText"),
        non_empty_str(&value, "legalAnalysis"),
    ) {
        (Some(refined_text), Some(legal_analysis)) => Ok(AiAnalysis {
            refined_text: refined_text.to_string(),
            legal_analysis: legal_analysis.to_string(),
        }),
        _ => Ok(fallback_analysis(description)),
    }
}

fn non_empty_str<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
