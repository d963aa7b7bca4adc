//! appointment-checklist: personalized healthcare-appointment checklists from Gemini
//!
//! # Overview
//!
//! Turns patient intake data into a checklist of questions to consider before,
//! during and after a medical appointment. A prompt is built from the
//! [`PatientProfile`], sent to a streaming [`GenerationService`] (Gemini via
//! [`GeminiClient`]), the streamed fragments are concatenated in arrival
//! order, and the text is parsed as JSON.
//!
//! The outcome is always a [`ChecklistResult`]:
//! - `Generated`: the model's JSON, re-serialized with 2-space indentation
//! - `Failed`: `{"error": "Could not generate a valid checklist", "raw_response": ...}`
//!
//! Service faults (network, HTTP status, quota) are returned as
//! [`ChecklistError`] and are not retried.
//!
//! # Quick Start
//!
//! ```no_run
//! use appointment_checklist::{ChecklistGenerator, GeminiClient, PatientProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = ChecklistGenerator::new(GeminiClient::from_env()?);
//!
//!     let profile = PatientProfile::new()
//!         .age("46")
//!         .location("Toronto")
//!         .conditions("hypertension")
//!         .medications("lisinopril");
//!
//!     let result = generator.generate(&profile).await?;
//!     println!("{}", result.to_json_string());
//!
//!     Ok(())
//! }
//! ```

mod backend;
mod checklist;
mod error;
mod generator;
#[cfg(feature = "logging")]
pub mod logging;
mod profile;
mod prompt;
mod request;

// Re-exports for convenience
pub use backend::{
    GenerationService, ScriptedFault, ScriptedService, TextChunk, TextStream, TokenUsage,
};
pub use checklist::{
    Checklist, ChecklistDocument, ChecklistFailure, ChecklistResult, PARSE_FAILURE_MESSAGE,
    extract_json_from_markdown, parse_checklist, parse_fenced_checklist,
};
pub use error::{ChecklistError, Result};
pub use generator::{AccumulatedText, ChecklistGenerator, GenerationReport, accumulate_text};
pub use profile::PatientProfile;
pub use prompt::{
    CHECKLIST_SECTIONS, NONE_REPORTED, NONE_SPECIFIED, NO_VALUE, build_checklist_prompt,
};
pub use request::{
    GenerationRequest, HarmBlockThreshold, HarmCategory, Model as GeminiModel, SafetySetting,
    SamplingConfig,
};

#[cfg(feature = "gemini")]
pub use backend::{GeminiAuth, GeminiClient, GeminiConfig};
