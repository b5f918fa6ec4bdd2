//! OpenAI Responses API fallback classifier.
//!
//! Sends the review keywords in one request per batch and asks for strict
//! structured output whose enums are the taxonomy's buckets, intents and
//! stages.
//!
//! # Examples
//!
//! ```no_run
//! use kwcat::config::Taxonomy;
//! use kwcat::fallback::{FallbackClassifier, OpenAIFallbackClassifier};
//!
//! # async fn example() -> kwcat::error::Result<()> {
//! let classifier = OpenAIFallbackClassifier::from_env()?;
//! let items = classifier
//!     .classify_batch(&["panchakarma retreat".to_string()], &Taxonomy::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Taxonomy;
use crate::error::{KwcatError, Result};
use crate::fallback::classifier::FallbackClassifier;
use crate::fallback::types::FallbackItem;

pub const DEFAULT_MODEL: &str = "gpt-5";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const SCHEMA_NAME: &str = "kw_classification";

/// Request body for the Responses API.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    /// Model identifier.
    model: &'a str,
    /// Instructions followed by the keyword list.
    input: String,
    /// Structured output settings.
    text: TextOptions,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    /// The `json_schema` format block.
    format: Value,
}

/// Response body from the Responses API.
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

/// One content part; only `output_text` parts carry the JSON payload.
#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Top-level object the schema asks the model to return.
#[derive(Debug, Deserialize)]
struct ItemsEnvelope {
    items: Vec<FallbackItem>,
}

/// Fallback classifier backed by the OpenAI Responses API.
///
/// Each call to [`classify_batch`](FallbackClassifier::classify_batch) is one
/// HTTP request. The request carries a strict JSON schema whose enums are the
/// taxonomy's buckets, intents and stages, so well-behaved responses only use
/// known values. The orchestrator still validates every item.
///
/// # Cost Considerations
///
/// Only the review subset of a batch is sent, and the rule pass resolves most
/// keywords. Lowering `fallback_batch_size` raises the number of requests but
/// not the number of keywords sent.
pub struct OpenAIFallbackClassifier {
    /// HTTP client for making API requests.
    client: Client,
    /// OpenAI API key for authentication.
    api_key: String,
    /// Model name (e.g. "gpt-5").
    model: String,
    /// API root without a trailing slash.
    base_url: String,
}

impl std::fmt::Debug for OpenAIFallbackClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIFallbackClassifier")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAIFallbackClassifier {
    /// Create a classifier with the default request timeout (5 minutes).
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model name to use
    ///
    /// # Errors
    ///
    /// Returns [`KwcatError::Config`] if the key is blank and
    /// [`KwcatError::Fallback`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kwcat::fallback::OpenAIFallbackClassifier;
    ///
    /// # fn example() -> kwcat::error::Result<()> {
    /// let classifier = OpenAIFallbackClassifier::new(
    ///     "sk-...".to_string(),
    ///     "gpt-5".to_string(),
    /// )?;
    /// assert_eq!(classifier.model(), "gpt-5");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_timeout(api_key, model, Duration::from_secs(300))
    }

    /// Create a classifier with a custom request timeout.
    ///
    /// Large batches on slow models can take minutes; a timed out request
    /// fails only its own chunk.
    pub fn with_timeout(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(KwcatError::config("OpenAI API key is empty"));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KwcatError::fallback(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Read `OPENAI_API_KEY` and `OPENAI_MODEL` (default `gpt-5`).
    ///
    /// # Errors
    ///
    /// Returns [`KwcatError::Config`] if `OPENAI_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| KwcatError::config("OPENAI_API_KEY is not set"))?;
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    /// Point the client at a compatible endpoint.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// JSON schema the model must fill, with enums taken from the taxonomy.
pub fn output_schema(taxonomy: &Taxonomy) -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "keyword": {"type": "string"},
                        "bucket_id": {"type": "string", "enum": taxonomy.buckets},
                        "intent": {"type": "string", "enum": taxonomy.intents},
                        "stage": {"type": "string", "enum": taxonomy.stages},
                        "is_negative": {"type": "string", "enum": ["Y", "N"]},
                        "negative_type": {"type": "string"},
                        "negative_theme": {"type": "string"},
                        "notes": {"type": "string"}
                    },
                    "required": [
                        "keyword", "bucket_id", "intent", "stage",
                        "is_negative", "negative_type", "negative_theme", "notes"
                    ],
                    "additionalProperties": false
                }
            }
        },
        "required": ["items"],
        "additionalProperties": false
    })
}

/// Instructions sent with every batch.
pub fn build_prompt(keywords: &[String]) -> String {
    let mut prompt = String::from(
        "Classify each keyword into the provided bucket taxonomy.\n\
         Rules:\n\
         - If Kerala Ayurveda brand token is present, never output NB-* buckets.\n\
         - If competitor brand token is present (and no KA token), never output KA-* buckets.\n\
         - If keyword is corporate/jobs/services/US-geo, mark is_negative='Y' and choose KA-NF* bucket if KA token present.\n\
         Return strictly the JSON schema.\n\n\
         Keywords:\n",
    );
    let lines: Vec<String> = keywords.iter().map(|k| format!("- {k}")).collect();
    prompt.push_str(&lines.join("\n"));
    prompt
}

/// Pull the structured items out of a Responses API body.
fn parse_response(body: &str) -> Result<Vec<FallbackItem>> {
    let response: ResponsesResponse = serde_json::from_str(body).map_err(|e| {
        KwcatError::fallback(format!("failed to parse OpenAI response: {e}"))
    })?;

    let text = response
        .output
        .iter()
        .flat_map(|item| item.content.iter())
        .find(|part| part.kind == "output_text")
        .and_then(|part| part.text.as_deref())
        .ok_or_else(|| KwcatError::fallback("no output_text in OpenAI response"))?;

    let envelope: ItemsEnvelope = serde_json::from_str(text).map_err(|e| {
        KwcatError::fallback(format!("structured output does not match schema: {e}"))
    })?;
    Ok(envelope.items)
}

#[async_trait]
impl FallbackClassifier for OpenAIFallbackClassifier {
    async fn classify_batch(
        &self,
        keywords: &[String],
        taxonomy: &Taxonomy,
    ) -> Result<Vec<FallbackItem>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let request = ResponsesRequest {
            model: &self.model,
            input: build_prompt(keywords),
            text: TextOptions {
                format: json!({
                    "type": "json_schema",
                    "name": SCHEMA_NAME,
                    "schema": output_schema(taxonomy),
                    "strict": true
                }),
            },
        };

        debug!(
            "Sending {} keywords to OpenAI model {}",
            keywords.len(),
            self.model
        );

        let http_response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| KwcatError::fallback(format!("OpenAI API request failed: {e}")))?;

        let status = http_response.status();
        let response_text = http_response
            .text()
            .await
            .map_err(|e| KwcatError::fallback(format!("failed to read response text: {e}")))?;

        if !status.is_success() {
            return Err(KwcatError::fallback(format!(
                "OpenAI API error (status {status}): {response_text}"
            )));
        }

        parse_response(&response_text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_uses_taxonomy_enums() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.buckets.push("NB-3".to_string());

        let schema = output_schema(&taxonomy);
        let item = &schema["properties"]["items"]["items"]["properties"];
        let buckets = item["bucket_id"]["enum"].as_array().unwrap();
        assert!(buckets.iter().any(|b| b == "NB-3"));
        assert_eq!(item["intent"]["enum"].as_array().unwrap().len(), 5);
        assert_eq!(item["stage"]["enum"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_prompt_lists_keywords() {
        let prompt = build_prompt(&["triphala churna".to_string(), "ayurveda jobs".to_string()]);
        assert!(prompt.starts_with("Classify each keyword"));
        assert!(prompt.ends_with("- triphala churna\n- ayurveda jobs"));
    }

    #[test]
    fn test_parse_response_skips_reasoning_items() {
        let body = r#"{
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [{
                    "type": "output_text",
                    "text": "{\"items\":[{\"keyword\":\"panchakarma\",\"bucket_id\":\"NB-2\",\"intent\":\"LEARN\",\"stage\":\"TOF\",\"is_negative\":\"N\",\"negative_type\":\"None\",\"negative_theme\":\"None\",\"notes\":\"therapy\"}]}"
                }]}
            ]
        }"#;
        let items = parse_response(body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].keyword, "panchakarma");
        assert_eq!(items[0].bucket_id, "NB-2");
    }

    #[test]
    fn test_parse_response_without_text() {
        let err = parse_response(r#"{"output": []}"#).unwrap_err();
        assert!(matches!(err, KwcatError::Fallback(_)));
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let err = OpenAIFallbackClassifier::new("  ".to_string(), DEFAULT_MODEL.to_string())
            .unwrap_err();
        assert!(matches!(err, KwcatError::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let classifier =
            OpenAIFallbackClassifier::new("sk-test".to_string(), "gpt-5-mini".to_string())
                .unwrap()
                .with_base_url("http://localhost:8080/v1/");
        assert_eq!(classifier.base_url, "http://localhost:8080/v1");
        assert_eq!(classifier.model(), "gpt-5-mini");
    }
}
