use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Gemini model identifiers.
///
/// The checklist generator defaults to [`Model::Gemini20Flash001`]. Any other
/// id can be used through [`Model::Custom`] or by parsing a string:
///
/// ```rust
/// use appointment_checklist::GeminiModel;
/// use std::str::FromStr;
///
/// let model = GeminiModel::from_str("gemini-2.5-flash").unwrap();
/// assert_eq!(model, GeminiModel::Gemini25Flash);
///
/// let model = GeminiModel::from_string("gemini-custom");
/// assert_eq!(model, GeminiModel::Custom("gemini-custom".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Model {
    /// Gemini 2.5 Pro
    Gemini25Pro,
    /// Gemini 2.5 Flash
    Gemini25Flash,
    /// Gemini 2.5 Flash Lite
    Gemini25FlashLite,
    /// Gemini 2.0 Flash (alias tracking the latest 2.0 Flash build)
    Gemini20Flash,
    /// Gemini 2.0 Flash 001, the pinned build checklists are tuned against
    #[default]
    Gemini20Flash001,
    /// Gemini 2.0 Flash Lite
    Gemini20FlashLite,
    /// Any other model id, including tuned or regional variants
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemini20Flash001 => "gemini-2.0-flash-001",
            Model::Gemini20FlashLite => "gemini-2.0-flash-lite",
            Model::Custom(name) => name,
        }
    }

    /// Create a model from a string. Unknown ids become `Custom`.
    pub fn from_string(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-2.0-flash-001" => Model::Gemini20Flash001,
            "gemini-2.0-flash-lite" => Model::Gemini20FlashLite,
            _ => Model::Custom(name),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from_string(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::from_string(s)
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::from_string(s)
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
