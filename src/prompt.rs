//! Prompt construction for checklist generation.

use crate::profile::{PatientProfile, provided};

/// Placeholder for absent pre-existing conditions and medications.
pub const NONE_REPORTED: &str = "None reported";
/// Placeholder for absent health concerns.
pub const NONE_SPECIFIED: &str = "None specified";
/// Rendered for an absent demographic field. An empty value is kept as-is.
pub const NO_VALUE: &str = "None";

/// The five top-level keys the model is asked to return, in order.
pub const CHECKLIST_SECTIONS: [&str; 5] = [
    "introduction",
    "pre_appointment",
    "during_appointment",
    "post_appointment",
    "emotional_support",
];

const INSTRUCTIONS: &str = r#"Provide a structured checklist in JSON format with the following sections:
1. "introduction": A brief, empathetic message acknowledging the patient's situation and concerns (2-3 sentences)
2. "pre_appointment": A list of questions for the patient to consider BEFORE the appointment (about preparations, documents to bring, information to gather)
3. "during_appointment": A list of questions for the patient to ask DURING the appointment (4-6 thoughtful, personalized questions based on specific conditions and concerns)
4. "post_appointment": A list of questions about follow-up items and next steps AFTER the appointment
5. "emotional_support": Brief supportive message to help reduce anxiety about the appointment (1-2 sentences)

For all sections, ensure the content is formatted as questions rather than statements.
For example, instead of "Bring your insurance card", use "Have you packed your insurance card?"

The questions should consider:
- The patient's specific conditions and how they might be progressing or managed
- Age-appropriate health concerns and preventative measures
- Medication interactions or side effects if medications are listed
- Regional or ethnic-specific health considerations when relevant
- Addressing any specific concerns they've mentioned

Ensure all advice is personalized to their specific situation rather than generic medical advice."#;

/// Build the checklist prompt for a patient.
///
/// Every provided field is embedded verbatim. Missing or empty conditions and
/// medications become [`NONE_REPORTED`], missing or empty concerns become
/// [`NONE_SPECIFIED`]. A missing demographic field renders as [`NO_VALUE`],
/// while an empty one renders empty. This never fails, and the output depends
/// only on the profile.
///
/// ```
/// use appointment_checklist::{PatientProfile, build_checklist_prompt};
///
/// let profile = PatientProfile::new().age("67").medications("metformin");
/// let prompt = build_checklist_prompt(&profile);
///
/// assert!(prompt.contains("- Age: 67"));
/// assert!(prompt.contains("- Current medications and supplements: metformin"));
/// assert!(prompt.contains("- Health concerns: None specified"));
/// ```
pub fn build_checklist_prompt(profile: &PatientProfile) -> String {
    let field = |value: &Option<String>, placeholder: &'static str| -> String {
        provided(value).unwrap_or(placeholder).to_string()
    };
    let demographic = |value: &Option<String>| value.as_deref().unwrap_or(NO_VALUE).to_string();

    let patient_profile = format!(
        "- Height: {}\n\
         - Weight: {}\n\
         - Age: {}\n\
         - Location: {}\n\
         - Ethnicity: {}\n\
         - Pre-existing conditions: {}\n\
         - Health concerns: {}\n\
         - Current medications and supplements: {}",
        demographic(&profile.height),
        demographic(&profile.weight),
        demographic(&profile.age),
        demographic(&profile.location),
        demographic(&profile.ethnicity),
        field(&profile.conditions, NONE_REPORTED),
        field(&profile.concerns, NONE_SPECIFIED),
        field(&profile.medications, NONE_REPORTED),
    );

    format!(
        "Create a compassionate, personalized healthcare appointment checklist for a patient with the following characteristics:\n{}\n\n{}\n",
        patient_profile, INSTRUCTIONS
    )
}
