/// Token usage reported by the generation service.
///
/// Gemini repeats cumulative counts on streamed chunks; the last one seen is
/// the total for the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    /// The model that served the request
    pub model: String,
    /// Tokens in the prompt
    pub input_tokens: u64,
    /// Tokens generated
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(model: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            model: model.into(),
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used (input + output)
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
