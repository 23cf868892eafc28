//! Google Gemini API driver.
//!
//! This module implements the [`TextDriver`] trait for the Gemini v1beta
//! REST API, using `:generateContent` for single completions and
//! `:streamGenerateContent?alt=sse` for chunked streaming.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use super::{GenRequest, GenerationSettings, TextDriver, TurnRole};

// ─────────────────────────────────────────────────────────────────────────────
// API Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Driver for the Gemini generative-language API.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: GenerationSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish()
    }
}

impl GeminiDriver {
    /// Create a new driver with the given settings.
    #[must_use]
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            settings,
        }
    }

    fn api_key(&self) -> anyhow::Result<&str> {
        self.settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Gemini API key not found. Set GEMINI_API_KEY or add it to the config file."
                )
            })
    }

    /// Build the request URL for a given API verb.
    fn request_url(&self, verb: &str, streaming: bool) -> anyhow::Result<String> {
        let key = self.api_key()?;
        let base = self.settings.base_url.trim_end_matches('/');
        let model = &self.settings.model;
        let sse = if streaming { "alt=sse&" } else { "" };
        Ok(format!("{base}/v1beta/models/{model}:{verb}?{sse}key={key}"))
    }

    fn build_body(&self, req: &GenRequest) -> GenerateContentRequest {
        let system_instruction = req.system.as_ref().map(|sys| Content {
            role: None,
            parts: vec![Part { text: sys.clone() }],
        });

        let contents = req
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: req.temperature.unwrap_or(self.settings.temperature),
            },
        }
    }
}

#[async_trait::async_trait]
impl TextDriver for GeminiDriver {
    async fn generate(&self, req: GenRequest) -> anyhow::Result<String> {
        let url = self.request_url("generateContent", false)?;
        let body = self.build_body(&req);

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({status}): {error_text}");
        }

        let result: GenerateContentResponse = response.json().await?;

        if let Some(err) = result.error {
            anyhow::bail!("Gemini API error: {}", err.message);
        }

        result
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow::anyhow!("No response from Gemini"))
    }

    async fn stream(
        &self,
        req: GenRequest,
    ) -> anyhow::Result<std::pin::Pin<Box<dyn Stream<Item = anyhow::Result<String>> + Send>>> {
        let url = self.request_url("streamGenerateContent", true)?;
        let body = self.build_body(&req);

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let byte_stream = resp.bytes_stream();

        let out = async_stream::try_stream! {
            let mut buf = Vec::<u8>::new();

            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk?;
                buf.extend_from_slice(&chunk);

                while let Some(pos) = find_double_newline(&buf) {
                    let frame = buf.drain(..pos + 2).collect::<Vec<_>>();
                    let text = String::from_utf8_lossy(&frame);

                    for line in text.lines() {
                        let line = line.trim();
                        if !line.starts_with("data:") {
                            continue;
                        }
                        let data = line.trim_start_matches("data:").trim();
                        if data.is_empty() {
                            continue;
                        }

                        if let Some(s) = parse_frame(data)? {
                            if !s.is_empty() {
                                yield s;
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(out))
    }
}

/// Parse one streamed `data:` payload into its text, if any.
///
/// In-band API errors become `Err`; frames without text parts (safety
/// metadata, usage counts) are `Ok(None)`.
fn parse_frame(data: &str) -> anyhow::Result<Option<String>> {
    let v: serde_json::Value = serde_json::from_str(data)?;

    if let Some(message) = v["error"]["message"].as_str() {
        anyhow::bail!("Gemini API error: {message}");
    }

    Ok(frame_text(&v))
}

/// Extract the text parts of a streamed response frame.
fn frame_text(v: &serde_json::Value) -> Option<String> {
    let parts = v["candidates"][0]["content"]["parts"].as_array()?;
    let text = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<String>();
    Some(text)
}

/// Find the position of a double newline in the buffer.
fn find_double_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}
