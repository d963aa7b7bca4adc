use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::backend::client::{GenerationService, TextChunk, TextStream};
use crate::backend::sse::SseDecoder;
use crate::backend::usage::TokenUsage;
use crate::backend::utils::{check_response_status, handle_http_error};
use crate::error::{ChecklistError, Result};
use crate::request::{GenerationRequest, Model, SafetySetting, SamplingConfig};

const PROVIDER: &str = "Gemini";
const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// How requests are authorized, which also decides the endpoint.
#[derive(Clone)]
pub enum GeminiAuth {
    /// Gemini API (Google AI Studio) key, sent as the `key` query parameter
    ApiKey(String),
    /// Vertex AI, with an OAuth access token sent as a bearer token
    VertexAi {
        project: String,
        location: String,
        access_token: String,
    },
}

impl fmt::Debug for GeminiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiAuth::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            GeminiAuth::VertexAi {
                project, location, ..
            } => f
                .debug_struct("VertexAi")
                .field("project", project)
                .field("location", location)
                .field("access_token", &"<redacted>")
                .finish(),
        }
    }
}

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub auth: GeminiAuth,
    pub timeout: Option<Duration>,
    /// Overrides the endpoint base, up to and excluding `/models/...`
    pub base_url: Option<String>,
}

/// Streaming client for Gemini, via the Gemini API or Vertex AI.
///
/// # Examples
///
/// ```no_run
/// use appointment_checklist::{ChecklistGenerator, GeminiClient, PatientProfile};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::from_env()?.timeout(Duration::from_secs(120));
/// let generator = ChecklistGenerator::new(client);
///
/// let profile = PatientProfile::new().age("58").conditions("type 2 diabetes");
/// let result = generator.generate(&profile).await?;
/// println!("{}", result.to_json_string());
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for the Gemini API with the provided key.
    #[instrument(name = "gemini_client_new", skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChecklistError::ConfigError(
                "API key cannot be empty. Use GeminiClient::from_env() to read from GEMINI_API_KEY environment variable.".to_string(),
            ));
        }

        info!("Created Gemini API client");
        Ok(Self::with_auth(GeminiAuth::ApiKey(api_key)))
    }

    /// Create a Gemini API client from the `GEMINI_API_KEY` environment variable.
    #[instrument(name = "gemini_client_from_env")]
    pub fn from_env() -> Result<Self> {
        let api_key = required_env("GEMINI_API_KEY")?;
        Self::new(api_key)
    }

    /// Create a Vertex AI client.
    ///
    /// `access_token` is an OAuth 2.0 token for a principal with access to
    /// `project`, e.g. the output of `gcloud auth print-access-token`.
    /// Minting and refreshing it is up to the caller.
    #[instrument(name = "gemini_client_vertex", skip_all)]
    pub fn vertex(
        project: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let project = project.into();
        let location = location.into();
        let access_token = access_token.into();
        if project.is_empty() || location.is_empty() {
            return Err(ChecklistError::ConfigError(
                "Vertex AI project and location cannot be empty".to_string(),
            ));
        }
        if access_token.is_empty() {
            return Err(ChecklistError::ConfigError(
                "Vertex AI access token cannot be empty".to_string(),
            ));
        }

        info!(project = %project, location = %location, "Created Vertex AI client");
        Ok(Self::with_auth(GeminiAuth::VertexAi {
            project,
            location,
            access_token,
        }))
    }

    /// Create a Vertex AI client from `GOOGLE_CLOUD_PROJECT`,
    /// `GOOGLE_CLOUD_LOCATION` (default `us-central1`) and
    /// `GOOGLE_CLOUD_ACCESS_TOKEN`.
    #[instrument(name = "gemini_client_vertex_from_env")]
    pub fn vertex_from_env() -> Result<Self> {
        let project = required_env("GOOGLE_CLOUD_PROJECT")?;
        let location = std::env::var("GOOGLE_CLOUD_LOCATION")
            .ok()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_string());
        let access_token = required_env("GOOGLE_CLOUD_ACCESS_TOKEN")?;
        Self::vertex(project, location, access_token)
    }

    fn with_auth(auth: GeminiAuth) -> Self {
        Self {
            config: GeminiConfig {
                auth,
                timeout: None,
                base_url: None,
            },
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Set the timeout for each HTTP request, covering the whole streamed body.
    #[instrument(skip(self))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        debug!(
            previous_timeout = ?self.config.timeout,
            new_timeout = ?timeout,
            "Setting timeout"
        );
        self.config.timeout = Some(timeout);

        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    error = %e,
                    "Failed to build reqwest client with timeout, using default"
                );
                reqwest::Client::new()
            });

        self
    }

    /// Use a preconfigured HTTP client, e.g. one with custom proxy or TLS settings.
    ///
    /// Replaces the client built by [`timeout`](Self::timeout); set the
    /// timeout on `client` itself instead.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        debug!("Using caller-supplied HTTP client");
        self.client = client;
        self
    }

    /// Set a custom base URL, e.g. a proxy or a local test server.
    ///
    /// The model path is appended to it: `{base_url}/models/{model}:streamGenerateContent`.
    #[instrument(skip(self, base_url))]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(
            previous_base_url = ?self.config.base_url,
            new_base_url = %base_url,
            "Setting custom base URL"
        );
        self.config.base_url = Some(base_url);
        self
    }

    /// The streaming endpoint for `model`, without query parameters.
    pub fn stream_url(&self, model: &Model) -> String {
        let base = match (&self.config.base_url, &self.config.auth) {
            (Some(base_url), _) => base_url.clone(),
            (None, GeminiAuth::ApiKey(_)) => GEMINI_API_BASE_URL.to_string(),
            (None, GeminiAuth::VertexAi {
                project, location, ..
            }) => vertex_base_url(project, location),
        };
        format!("{}/models/{}:streamGenerateContent", base, model.as_str())
    }
}

fn vertex_base_url(project: &str, location: &str) -> String {
    let host = if location == "global" {
        "aiplatform.googleapis.com".to_string()
    } else {
        format!("{}-aiplatform.googleapis.com", location)
    };
    format!(
        "https://{}/v1/projects/{}/locations/{}/publishers/google",
        host, project, location
    )
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ChecklistError::ConfigError(format!(
            "{} environment variable is not set",
            name
        ))),
    }
}

// Gemini API request and response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamGenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a SamplingConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> From<&'a GenerationRequest> for StreamGenerateContentRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: &request.sampling,
            safety_settings: &request.safety_settings,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Decode one `data:` payload into a chunk.
fn parse_stream_payload(payload: &str, requested_model: &str) -> Result<TextChunk> {
    let response: GenerateContentResponse = serde_json::from_str(payload).map_err(|e| {
        error!(error = %e, payload = %payload, "Failed to decode Gemini stream event");
        ChecklistError::StreamError(format!("invalid Gemini stream event: {}", e))
    })?;

    if let Some(err) = response.error {
        error!(code = ?err.code, status = ?err.status, message = %err.message, "Gemini stream reported an error");
        return Err(ChecklistError::ApiError(format!(
            "{} API error ({}): {}",
            PROVIDER,
            err.status.as_deref().unwrap_or("UNKNOWN"),
            err.message
        )));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            error!(block_reason = %reason, "Gemini blocked the prompt");
            return Err(ChecklistError::ApiError(format!(
                "{} blocked the prompt: {}",
                PROVIDER, reason
            )));
        }
        // usage-only trailer
        let model = response
            .model_version
            .unwrap_or_else(|| requested_model.to_string());
        return Ok(TextChunk {
            text: String::new(),
            finish_reason: None,
            usage: response.usage_metadata.map(|u| {
                TokenUsage::new(model, u.prompt_token_count, u.candidates_token_count)
            }),
        });
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let model = response
        .model_version
        .unwrap_or_else(|| requested_model.to_string());
    Ok(TextChunk {
        text,
        finish_reason: candidate.finish_reason,
        usage: response
            .usage_metadata
            .map(|u| TokenUsage::new(model, u.prompt_token_count, u.candidates_token_count)),
    })
}

struct EventStreamState<S> {
    inner: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<TextChunk>>,
    finished: bool,
    model: String,
}

/// Turn a streamed HTTP body into decoded chunks, in arrival order.
///
/// Transport errors surface as a final `Err` item.
fn decode_event_stream<S, B>(inner: S, model: String) -> TextStream
where
    S: Stream<Item = std::result::Result<B, reqwest::Error>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = EventStreamState {
        inner,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        model,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(bytes)) => match state.decoder.push(bytes.as_ref()) {
                    Ok(payloads) => {
                        for payload in payloads {
                            trace!(payload_len = payload.len(), "Received Gemini stream event");
                            state
                                .pending
                                .push_back(parse_stream_payload(&payload, &state.model));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Undecodable Gemini event stream");
                        state.finished = true;
                        state.pending.push_back(Err(e));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(handle_http_error(e, PROVIDER)));
                }
                None => {
                    state.finished = true;
                    match state.decoder.finish() {
                        Ok(Some(payload)) => state
                            .pending
                            .push_back(parse_stream_payload(&payload, &state.model)),
                        Ok(None) => {}
                        Err(e) => state.pending.push_back(Err(e)),
                    }
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl GenerationService for GeminiClient {
    #[instrument(
        name = "gemini_stream_generate",
        skip(self, request),
        fields(
            model = %request.model,
            prompt_len = request.prompt.len()
        )
    )]
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        info!("Starting streamed generation with Gemini");

        let body = StreamGenerateContentRequest::from(request);
        let url = self.stream_url(&request.model);
        debug!(url = %url, "Sending request to Gemini API");

        let mut builder = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header("Content-Type", "application/json");
        builder = match &self.config.auth {
            GeminiAuth::ApiKey(api_key) => builder.query(&[("key", api_key)]),
            GeminiAuth::VertexAi { access_token, .. } => builder.bearer_auth(access_token),
        };

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| handle_http_error(e, PROVIDER))?;
        let response = check_response_status(response, PROVIDER).await?;

        debug!("Gemini accepted the request, streaming response");
        Ok(decode_event_stream(
            Box::pin(response.bytes_stream()),
            request.model.as_str().to_string(),
        ))
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
