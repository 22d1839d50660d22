use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::InferenceError;

/// Ollama-style text generation endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Keys checked, in order, when the service answers with a JSON object.
const TEXT_KEYS: &[&str] = &["response", "code", "fix", "text"];

/// Error bodies are truncated to this many characters before they are carried in errors.
const MAX_ERROR_BODY: usize = 400;

/// Sampling options passed through to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_ctx: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            num_ctx: 4096,
        }
    }
}

/// One non-streaming generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options,
        }
    }
}

/// Port for the inference service.
///
/// Implementations return the generated text, already pulled out of whatever envelope the
/// service wraps it in.
pub trait InferencePort {
    fn generate(&self, request: &GenerateRequest) -> Result<String, InferenceError>;
}

/// Blocking HTTP client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build inference HTTP client: {e}"))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl InferencePort for OllamaClient {
    fn generate(&self, request: &GenerateRequest) -> Result<String, InferenceError> {
        tracing::debug!(endpoint = %self.endpoint, model = %request.model, "inference request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        if !status.is_success() {
            return Err(InferenceError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        extract_response_text(&body).ok_or_else(|| InferenceError::Decode {
            message: format!(
                "no text field in response: {}",
                truncate_chars(&body, MAX_ERROR_BODY)
            ),
        })
    }
}

fn transport_error(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else {
        InferenceError::Transport {
            message: err.to_string(),
        }
    }
}

/// Pull the generated text out of a service reply.
///
/// Accepted shapes, in order:
/// - a JSON string
/// - a JSON object carrying `response`, `code`, `fix` or `text`
/// - non-JSON text containing a balanced `{...}` block of one of the above shapes
/// - anything else that is not JSON is taken verbatim
///
/// Returns `None` only for valid JSON that carries no text.
pub fn extract_response_text(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return text_from_value(&value);
    }

    if let Some(fragment) = first_balanced_object(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fragment)
        && let Some(text) = text_from_value(&value)
    {
        return Some(text);
    }

    Some(trimmed.to_string())
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// First `{...}` block whose braces balance, ignoring braces inside JSON strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
