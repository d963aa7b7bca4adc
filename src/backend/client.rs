use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;

use crate::backend::usage::TokenUsage;
use crate::error::Result;
use crate::request::GenerationRequest;

/// One fragment of a streamed response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextChunk {
    /// Text carried by this fragment; may be empty
    pub text: String,
    /// Set on the fragment that ends a candidate, e.g. `STOP` or `MAX_TOKENS`
    pub finish_reason: Option<String>,
    /// Cumulative usage reported so far, if the service includes it
    pub usage: Option<TokenUsage>,
}

impl TextChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// An ordered stream of response fragments.
///
/// The stream ends when the service completes the response. An `Err` item
/// is a service fault; consumers stop at the first one.
pub type TextStream = BoxStream<'static, Result<TextChunk>>;

/// A hosted text-generation service that streams its response.
///
/// This is the seam the [`ChecklistGenerator`](crate::ChecklistGenerator)
/// depends on. The crate ships [`GeminiClient`](crate::GeminiClient) for
/// Google's API and [`ScriptedService`](crate::ScriptedService) for tests.
///
/// # Examples
///
/// A service that answers every request with one fixed fragment:
///
/// ```
/// use appointment_checklist::{GenerationRequest, GenerationService, Result, TextChunk, TextStream};
/// use async_trait::async_trait;
/// use futures_util::StreamExt;
///
/// struct Canned;
///
/// #[async_trait]
/// impl GenerationService for Canned {
///     async fn stream_generate(&self, _request: &GenerationRequest) -> Result<TextStream> {
///         let chunks = vec![Ok(TextChunk::text("{}"))];
///         Ok(futures_util::stream::iter(chunks).boxed())
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Start a streamed generation.
    ///
    /// Errors returned here, or yielded by the stream, are faults the
    /// generator does not recover from.
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<TextStream>;

    /// Name used in logs.
    fn provider_name(&self) -> &str {
        "generation service"
    }
}

#[async_trait]
impl<'a, T: GenerationService + ?Sized> GenerationService for &'a T {
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        (**self).stream_generate(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for Arc<T> {
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<TextStream> {
        (**self).stream_generate(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}
