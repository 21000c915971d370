//! Gemini `generateContent` client.
//!
//! # Responsibility
//! - Issue structured-output requests for classification and sage prompts.
//! - Map HTTP/transport/payload problems to [`ClassificationError`].
//!
//! # Invariants
//! - HTTP 429 maps to `Quota`; other non-2xx statuses map to `Http`.
//! - Scores are clamped into the model's allowed ranges; non-finite scores
//!   and empty descriptions are rejected as `Parse`.
//! - The API key never appears in diagnostic logs.

use crate::ai::{ClassificationError, Classifier, SageClient, SageRequest, SageResponse};
use crate::config::ClassifierSettings;
use crate::logging::sanitize_message;
use crate::model::record::{Enrichment, SCORE_MAX, SCORE_MIN};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

const MAX_ERROR_BODY_CHARS: usize = 200;
const MAX_SAGE_RECORDS: usize = 200;

/// HTTP client for the Gemini generative language API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    settings: ClassifierSettings,
    api_key: Option<String>,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct AutoFillPayload {
    genre: String,
    #[serde(default)]
    tags: Vec<String>,
    synopsis: String,
    popularity: f64,
}

#[derive(Debug, Deserialize)]
struct SagePayload {
    #[serde(default)]
    titles: Vec<String>,
    synergy: f64,
    #[serde(default)]
    analysis: String,
}

impl GeminiClient {
    /// Builds a client with an explicit API key.
    ///
    /// A `None` key is accepted; every call then fails with `MissingApiKey`.
    pub fn new(
        settings: ClassifierSettings,
        api_key: Option<String>,
    ) -> Result<Self, ClassificationError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| ClassificationError::Network(format!("failed to build client: {err}")))?;

        Ok(Self {
            settings,
            api_key,
            http,
        })
    }

    /// Builds a client reading the API key from the configured env variable.
    pub fn from_settings(settings: ClassifierSettings) -> Result<Self, ClassificationError> {
        let api_key = settings.api_key_from_env();
        Self::new(settings, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.api_version,
            self.settings.model
        )
    }

    /// Sends one prompt with a response schema and returns the JSON text part.
    async fn generate(
        &self,
        operation: &str,
        prompt: String,
        schema: Value,
    ) -> Result<String, ClassificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClassificationError::MissingApiKey)?;

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let started_at = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    "event=gemini_request module=ai status=error operation={operation} duration_ms={} error_code=network",
                    started_at.elapsed().as_millis()
                );
                ClassificationError::Network(err.without_url().to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ClassificationError::Network(err.without_url().to_string()))?;

        debug!(
            "event=gemini_request module=ai status={} operation={operation} duration_ms={} http_status={}",
            if status.is_success() { "ok" } else { "error" },
            started_at.elapsed().as_millis(),
            status.as_u16()
        );

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassificationError::Quota(sanitize_message(
                &text,
                MAX_ERROR_BODY_CHARS,
            )));
        }
        if !status.is_success() {
            return Err(ClassificationError::Http {
                status: status.as_u16(),
                body: sanitize_message(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        extract_candidate_text(&text)
    }
}

#[async_trait]
impl Classifier for GeminiClient {
    async fn classify(&self, name: &str) -> Result<Enrichment, ClassificationError> {
        let text = self
            .generate("classify", classification_prompt(name), classification_schema())
            .await?;
        parse_enrichment(&text)
    }
}

#[async_trait]
impl SageClient for GeminiClient {
    async fn consult(&self, request: SageRequest<'_>) -> Result<SageResponse, ClassificationError> {
        let text = self
            .generate("sage", sage_prompt(&request), sage_schema())
            .await?;
        parse_sage(&text)
    }
}

fn classification_prompt(name: &str) -> String {
    format!(
        "Classify the video game \"{name}\". Return its main genre, three to five short \
         thematic tags, a synopsis of at most two sentences, and a popularity rating \
         between {SCORE_MIN} and {SCORE_MAX} stars."
    )
}

fn classification_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "genre": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "synopsis": { "type": "STRING" },
            "popularity": { "type": "NUMBER" },
        },
        "required": ["genre", "tags", "synopsis", "popularity"],
    })
}

fn sage_prompt(request: &SageRequest<'_>) -> String {
    let mut prompt = String::from(
        "You are a creative advisor for a video essay channel. Using the game collection \
         and the idea board below, propose three catchy video titles, rate the creative \
         synergy of the collection from 0 to 100, and give a short analysis.\n\nCollection:\n",
    );
    for record in request.records.iter().take(MAX_SAGE_RECORDS) {
        let category = record.category.as_deref().unwrap_or("unclassified");
        prompt.push_str(&format!(
            "- {} ({}) [{}] {}\n",
            record.name,
            record.platform,
            category,
            record.tags.join(", ")
        ));
    }
    if !request.ideas.is_empty() {
        prompt.push_str("\nIdeas:\n");
        for idea in request.ideas {
            prompt.push_str(&format!(
                "- {}: {} (trigger: {})\n",
                idea.title, idea.description, idea.trigger
            ));
        }
    }
    if let Some(seed) = request.seed.map(str::trim).filter(|seed| !seed.is_empty()) {
        prompt.push_str(&format!("\nFocus the suggestions on: {seed}\n"));
    }
    prompt
}

fn sage_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "titles": { "type": "ARRAY", "items": { "type": "STRING" } },
            "synergy": { "type": "NUMBER" },
            "analysis": { "type": "STRING" },
        },
        "required": ["titles", "synergy", "analysis"],
    })
}

/// Pulls `candidates[0].content.parts[*].text` out of a response body.
fn extract_candidate_text(body: &str) -> Result<String, ClassificationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ClassificationError::Parse(format!("response is not JSON: {err}")))?;

    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| ClassificationError::Parse("no candidates in response".to_string()))?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();

    if text.trim().is_empty() {
        return Err(ClassificationError::Parse(
            "candidate carries no text".to_string(),
        ));
    }
    Ok(text)
}

/// Models sometimes wrap JSON in markdown fences despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_enrichment(text: &str) -> Result<Enrichment, ClassificationError> {
    let payload: AutoFillPayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| ClassificationError::Parse(format!("invalid classification payload: {err}")))?;

    if !payload.popularity.is_finite() {
        return Err(ClassificationError::Parse(
            "popularity is not a finite number".to_string(),
        ));
    }
    let description = payload.synopsis.trim().to_string();
    if description.is_empty() {
        return Err(ClassificationError::Parse("synopsis is empty".to_string()));
    }

    Ok(Enrichment {
        category: payload.genre.trim().to_string(),
        tags: payload
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        description,
        score: payload.popularity.clamp(SCORE_MIN, SCORE_MAX),
    })
}

fn parse_sage(text: &str) -> Result<SageResponse, ClassificationError> {
    let payload: SagePayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| ClassificationError::Parse(format!("invalid sage payload: {err}")))?;

    if !payload.synergy.is_finite() {
        return Err(ClassificationError::Parse(
            "synergy is not a finite number".to_string(),
        ));
    }

    Ok(SageResponse {
        titles: payload.titles,
        synergy: payload.synergy.round().clamp(0.0, 100.0) as u8,
        analysis: payload.analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        extract_candidate_text, parse_enrichment, parse_sage, sage_prompt, strip_code_fence,
    };
    use crate::ai::{ClassificationError, SageRequest};
    use crate::model::idea::Idea;
    use crate::model::record::Record;

    #[test]
    fn parse_enrichment_trims_and_clamps() {
        let enrichment = parse_enrichment(
            r#"{"genre":" Horror ","tags":["Fog"," ","Psychological"],"synopsis":" A town. ","popularity":7.2}"#,
        )
        .unwrap();
        assert_eq!(enrichment.category, "Horror");
        assert_eq!(enrichment.tags, vec!["Fog", "Psychological"]);
        assert_eq!(enrichment.description, "A town.");
        assert_eq!(enrichment.score, 5.0);
    }

    #[test]
    fn parse_enrichment_rejects_empty_synopsis() {
        let err = parse_enrichment(r#"{"genre":"RPG","tags":[],"synopsis":"  ","popularity":3}"#)
            .unwrap_err();
        assert!(matches!(err, ClassificationError::Parse(_)));
    }

    #[test]
    fn parse_enrichment_accepts_fenced_json() {
        let enrichment = parse_enrichment(
            "```json\n{\"genre\":\"Platformer\",\"synopsis\":\"Jump.\",\"popularity\":4}\n```",
        )
        .unwrap();
        assert_eq!(enrichment.category, "Platformer");
        assert!(enrichment.tags.is_empty());
    }

    #[test]
    fn strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn extract_candidate_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(extract_candidate_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_candidate_text_rejects_missing_candidates() {
        let err = extract_candidate_text(r#"{"promptFeedback":{}}"#).unwrap_err();
        assert!(matches!(err, ClassificationError::Parse(_)));
    }

    #[test]
    fn parse_sage_clamps_synergy() {
        let response =
            parse_sage(r#"{"titles":["One","Two"],"synergy":140.4,"analysis":"Bold."}"#).unwrap();
        assert_eq!(response.synergy, 100);
        assert_eq!(response.titles.len(), 2);
    }

    #[test]
    fn sage_prompt_lists_records_ideas_and_seed() {
        let mut record = Record::new("Silent Hill", "PS1");
        record.category = Some("Horror".to_string());
        let records = vec![record];
        let ideas = vec![Idea::new("Aesthetic contrast", "cute vs heavy", "Curiosity")];

        let prompt = sage_prompt(&SageRequest {
            records: &records,
            ideas: &ideas,
            seed: Some("fog"),
        });
        assert!(prompt.contains("Silent Hill (PS1) [Horror]"));
        assert!(prompt.contains("Aesthetic contrast"));
        assert!(prompt.contains("Focus the suggestions on: fog"));
    }
}
