//! Checklist generation: prompt, streamed call, accumulation, parse.

use futures_util::StreamExt;
use tracing::{debug, info, instrument, trace};

use crate::backend::{GenerationService, TextStream, TokenUsage};
use crate::checklist::{ChecklistResult, parse_checklist, parse_fenced_checklist};
use crate::error::Result;
use crate::profile::PatientProfile;
use crate::prompt::build_checklist_prompt;
use crate::request::{GenerationRequest, Model};

/// Text drained from a [`TextStream`], plus what the stream reported about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatedText {
    /// All fragments concatenated in arrival order
    pub text: String,
    /// Number of fragments received, including empty ones
    pub chunk_count: usize,
    /// The last finish reason reported
    pub finish_reason: Option<String>,
    /// The last usage reported
    pub usage: Option<TokenUsage>,
}

/// Drain a stream, concatenating fragment text in arrival order.
///
/// The first `Err` item is returned as-is; text received before it is
/// dropped.
pub async fn accumulate_text(mut stream: TextStream) -> Result<AccumulatedText> {
    let mut acc = AccumulatedText::default();
    while let Some(item) = stream.next().await {
        let chunk = item?;
        acc.chunk_count += 1;
        trace!(
            chunk = acc.chunk_count,
            chunk_len = chunk.text.len(),
            "Received response chunk"
        );
        acc.text.push_str(&chunk.text);
        if chunk.finish_reason.is_some() {
            acc.finish_reason = chunk.finish_reason;
        }
        if chunk.usage.is_some() {
            acc.usage = chunk.usage;
        }
    }
    Ok(acc)
}

/// A checklist result together with the response it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub result: ChecklistResult,
    /// The accumulated model text, before parsing
    pub raw_response: String,
    pub chunk_count: usize,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Generates appointment checklists through an injected [`GenerationService`].
///
/// Each call builds its own request and result, so one generator can serve
/// many patients concurrently when its service is `Sync`.
///
/// # Errors
///
/// Faults from the service (transport, HTTP status, error payloads) are
/// returned as `Err` and are never retried. A response that is not valid
/// JSON is *not* an error: it comes back as [`ChecklistResult::Failed`].
///
/// # Examples
///
/// ```
/// use appointment_checklist::{ChecklistGenerator, PatientProfile, ScriptedService};
///
/// # async fn example() -> appointment_checklist::Result<()> {
/// let generator = ChecklistGenerator::new(ScriptedService::text("not json"));
/// let result = generator.generate(&PatientProfile::new().age("30")).await?;
///
/// let failure = result.failure().unwrap();
/// assert_eq!(failure.error, "Could not generate a valid checklist");
/// assert_eq!(failure.raw_response, "not json");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChecklistGenerator<S> {
    service: S,
    model: Model,
    extract_fenced_json: bool,
}

impl<S: GenerationService> ChecklistGenerator<S> {
    /// A generator using `gemini-2.0-flash-001`.
    pub fn new(service: S) -> Self {
        Self {
            service,
            model: Model::default(),
            extract_fenced_json: false,
        }
    }

    /// Set the model to request
    #[instrument(skip(self, model))]
    pub fn model(mut self, model: impl Into<Model>) -> Self {
        let model = model.into();
        debug!(
            previous_model = %self.model,
            new_model = %model,
            "Setting checklist model"
        );
        self.model = model;
        self
    }

    /// Unwrap a Markdown code fence around the response before parsing.
    ///
    /// Off by default. `raw_response` on failure is the unmodified text either way.
    pub fn extract_fenced_json(mut self, enabled: bool) -> Self {
        self.extract_fenced_json = enabled;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// The request [`generate`](Self::generate) would send for `profile`.
    pub fn build_request(&self, profile: &PatientProfile) -> GenerationRequest {
        GenerationRequest::checklist(build_checklist_prompt(profile), self.model.clone())
    }

    /// Generate a checklist for `profile`.
    pub async fn generate(&self, profile: &PatientProfile) -> Result<ChecklistResult> {
        Ok(self.generate_with_metadata(profile).await?.result)
    }

    /// Generate a checklist and keep the raw response, finish reason and usage.
    #[instrument(
        name = "generate_checklist",
        skip(self, profile),
        fields(
            provider = %self.service.provider_name(),
            model = %self.model,
            fields_provided = profile.provided_fields().len()
        )
    )]
    pub async fn generate_with_metadata(
        &self,
        profile: &PatientProfile,
    ) -> Result<GenerationReport> {
        let request = self.build_request(profile);
        info!(prompt_len = request.prompt.len(), "Requesting checklist");

        let stream = self.service.stream_generate(&request).await?;
        let acc = accumulate_text(stream).await?;

        debug!(
            chunks = acc.chunk_count,
            finish_reason = ?acc.finish_reason,
            raw_response = %acc.text,
            "Raw checklist response"
        );

        let result = if self.extract_fenced_json {
            parse_fenced_checklist(&acc.text)
        } else {
            parse_checklist(&acc.text)
        };

        if let Some(usage) = &acc.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                generated = result.is_generated(),
                "Checklist generation finished"
            );
        } else {
            info!(generated = result.is_generated(), "Checklist generation finished");
        }

        Ok(GenerationReport {
            result,
            raw_response: acc.text,
            chunk_count: acc.chunk_count,
            finish_reason: acc.finish_reason,
            usage: acc.usage,
        })
    }

    /// Blocking variant of [`generate`](Self::generate) for synchronous callers.
    ///
    /// Runs the call on a fresh current-thread tokio runtime. Panics if
    /// called from within a tokio runtime, as `block_on` does.
    pub fn generate_blocking(&self, profile: &PatientProfile) -> Result<ChecklistResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.generate(profile))
    }
}
