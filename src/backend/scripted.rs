use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Mutex;
use tracing::debug;

use crate::backend::client::{GenerationService, TextChunk, TextStream};
use crate::backend::usage::TokenUsage;
use crate::error::{ChecklistError, Result};
use crate::request::GenerationRequest;

/// A fault a [`ScriptedService`] raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFault {
    /// Surfaces as [`ChecklistError::ApiError`]
    Unavailable(String),
    /// Surfaces as [`ChecklistError::Timeout`]
    Timeout,
}

impl ScriptedFault {
    fn to_error(&self) -> ChecklistError {
        match self {
            ScriptedFault::Unavailable(message) => ChecklistError::ApiError(message.clone()),
            ScriptedFault::Timeout => ChecklistError::Timeout,
        }
    }
}

/// In-memory [`GenerationService`] that replays a fixed script.
///
/// Use it to drive a [`ChecklistGenerator`](crate::ChecklistGenerator)
/// without a network: it yields the configured fragments in order, can
/// fail before or during the stream, and records every request it receives.
///
/// ```
/// use appointment_checklist::{ChecklistGenerator, PatientProfile, ScriptedService};
///
/// # async fn example() -> appointment_checklist::Result<()> {
/// let service = ScriptedService::chunks(["{\"a\":", "1}"]);
/// let generator = ChecklistGenerator::new(&service);
///
/// let result = generator.generate(&PatientProfile::new()).await?;
/// assert!(result.is_generated());
/// assert_eq!(service.call_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScriptedService {
    chunks: Vec<TextChunk>,
    call_fault: Option<ScriptedFault>,
    stream_fault: Option<ScriptedFault>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedService {
    /// Yield each fragment in order, then complete.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(TextChunk::text).collect(),
            call_fault: None,
            stream_fault: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Yield the whole text as a single fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::chunks([text.into()])
    }

    /// Fail when called, before any stream exists.
    pub fn failing(fault: ScriptedFault) -> Self {
        let mut service = Self::chunks(Vec::<String>::new());
        service.call_fault = Some(fault);
        service
    }

    /// After the scripted fragments, yield `fault` instead of completing.
    pub fn then_fail(mut self, fault: ScriptedFault) -> Self {
        self.stream_fault = Some(fault);
        self
    }

    /// Mark the last fragment as finished with `reason` and attach `usage`.
    pub fn finish_with(mut self, reason: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        if self.chunks.is_empty() {
            self.chunks.push(TextChunk::default());
        }
        if let Some(last) = self.chunks.last_mut() {
            last.finish_reason = Some(reason.into());
            last.usage = usage;
        }
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(fault) = &self.call_fault {
            debug!(fault = ?fault, "Scripted service failing the call");
            return Err(fault.to_error());
        }

        let mut items: Vec<Result<TextChunk>> = self.chunks.iter().cloned().map(Ok).collect();
        if let Some(fault) = &self.stream_fault {
            items.push(Err(fault.to_error()));
        }
        debug!(items = items.len(), "Scripted service streaming");
        Ok(stream::iter(items).boxed())
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
