pub mod client;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod scripted;
#[cfg(feature = "gemini")]
mod sse;
pub mod usage;
#[cfg(feature = "gemini")]
mod utils;

pub use client::{GenerationService, TextChunk, TextStream};
#[cfg(feature = "gemini")]
pub use gemini::{GeminiAuth, GeminiClient, GeminiConfig};
pub use scripted::{ScriptedFault, ScriptedService};
pub use usage::TokenUsage;
