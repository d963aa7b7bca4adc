use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Patient intake data used to personalize a checklist.
///
/// Every field is optional free text. No validation is applied. The prompt
/// treats an empty conditions, concerns or medications value like a missing
/// one; demographic fields are embedded exactly as given.
///
/// Profiles usually arrive as JSON from a form or request body. Numbers and
/// booleans are accepted and kept as their JSON text, `null` means absent and
/// unknown keys are ignored:
///
/// ```
/// use appointment_checklist::PatientProfile;
///
/// let profile: PatientProfile = serde_json::from_str(
///     r#"{"age": 54, "location": "Lagos", "medications": null, "notes": "ignored"}"#,
/// ).unwrap();
///
/// assert_eq!(profile.age.as_deref(), Some("54"));
/// assert_eq!(profile.location.as_deref(), Some("Lagos"));
/// assert!(profile.medications.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ethnicity: Option<String>,
    /// Pre-existing conditions
    #[serde(default, deserialize_with = "lenient_text")]
    pub conditions: Option<String>,
    /// Health concerns the patient wants to raise
    #[serde(default, deserialize_with = "lenient_text")]
    pub concerns: Option<String>,
    /// Current medications and supplements
    #[serde(default, deserialize_with = "lenient_text")]
    pub medications: Option<String>,
}

macro_rules! profile_setters {
    ($($field:ident),* $(,)?) => {
        impl PatientProfile {
            $(
                #[doc = concat!("Set `", stringify!($field), "`.")]
                pub fn $field(mut self, value: impl Into<String>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

profile_setters!(
    height,
    weight,
    age,
    location,
    ethnicity,
    conditions,
    concerns,
    medications,
);

impl PatientProfile {
    /// An empty profile; every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field names paired with their provided values, in prompt order.
    ///
    /// Empty strings are skipped.
    pub fn provided_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("height", &self.height),
            ("weight", &self.weight),
            ("age", &self.age),
            ("location", &self.location),
            ("ethnicity", &self.ethnicity),
            ("conditions", &self.conditions),
            ("concerns", &self.concerns),
            ("medications", &self.medications),
        ]
        .into_iter()
        .filter_map(|(name, value)| provided(value).map(|v| (name, v)))
        .collect()
    }
}

/// The field's value unless it is absent or empty.
pub(crate) fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
