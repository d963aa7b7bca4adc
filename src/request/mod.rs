//! The generation request handed to a [`GenerationService`](crate::GenerationService).

mod model;

pub use model::Model;

use serde::Serialize;

/// Sampling parameters for one generation call.
///
/// Serializes to the Gemini `generationConfig` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<String>,
}

impl SamplingConfig {
    /// The fixed configuration used for checklists: temperature 1.0,
    /// top-p 0.95, 8192 output tokens, text only.
    pub fn checklist() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            max_output_tokens: 8192,
            response_modalities: vec!["TEXT".to_string()],
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::checklist()
    }
}

/// Content categories the service can filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::HateSpeech,
        HarmCategory::DangerousContent,
        HarmCategory::SexuallyExplicit,
        HarmCategory::Harassment,
    ];
}

/// How aggressively a category is filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    /// Filter disabled; no safety metadata is returned either
    Off,
    /// Never block, but still report ratings
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// One per-category safety threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }

    /// All four categories switched off, as checklist requests send them.
    pub fn all_off() -> Vec<SafetySetting> {
        HarmCategory::ALL
            .into_iter()
            .map(|category| SafetySetting::new(category, HarmBlockThreshold::Off))
            .collect()
    }
}

/// Everything a service needs to produce one streamed response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Model,
    pub sampling: SamplingConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationRequest {
    /// A request with the checklist sampling configuration and safety
    /// filters off.
    pub fn checklist(prompt: impl Into<String>, model: Model) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            sampling: SamplingConfig::checklist(),
            safety_settings: SafetySetting::all_off(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sampling_config_uses_gemini_field_names() {
        let value = serde_json::to_value(SamplingConfig::checklist()).unwrap();
        assert_eq!(value["temperature"], json!(1.0));
        assert!((value["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(value["maxOutputTokens"], json!(8192));
        assert_eq!(value["responseModalities"], json!(["TEXT"]));
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn safety_settings_serialize_as_enum_names() {
        let value = serde_json::to_value(SafetySetting::all_off()).unwrap();
        assert_eq!(
            value,
            json!([
                {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "OFF"},
                {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "OFF"}
            ])
        );
    }

    #[test]
    fn block_threshold_names() {
        let value = serde_json::to_value(HarmBlockThreshold::BlockMediumAndAbove).unwrap();
        assert_eq!(value, json!("BLOCK_MEDIUM_AND_ABOVE"));
    }
}
