//! Generate a checklist for a patient profile read from a JSON file.
//!
//! ```bash
//! export GEMINI_API_KEY=your_key_here
//! cargo run --example checklist -- profile.json
//! ```
//!
//! With `GOOGLE_CLOUD_PROJECT` and `GOOGLE_CLOUD_ACCESS_TOKEN` set, the
//! request goes to Vertex AI instead. Without a file argument a sample
//! profile is used.

use appointment_checklist::{
    ChecklistGenerator, GeminiClient, PatientProfile,
    logging::{LogLevel, init_logging},
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogLevel::Info);

    let profile = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str::<PatientProfile>(&std::fs::read_to_string(path)?)?,
        None => PatientProfile::new()
            .height("165 cm")
            .weight("72 kg")
            .age("61")
            .location("Manchester, UK")
            .ethnicity("South Asian")
            .conditions("type 2 diabetes, mild hypertension")
            .concerns("tingling in feet, more tired than usual")
            .medications("metformin 500mg twice daily, vitamin D"),
    };

    let client = if std::env::var("GOOGLE_CLOUD_PROJECT").is_ok() {
        GeminiClient::vertex_from_env()?
    } else {
        GeminiClient::from_env()?
    };
    let generator = ChecklistGenerator::new(client.timeout(Duration::from_secs(180)));

    let report = generator.generate_with_metadata(&profile).await?;
    println!("{}", report.result.to_json_string());

    if let Some(usage) = report.usage {
        eprintln!(
            "{}: {} input + {} output tokens",
            usage.model, usage.input_tokens, usage.output_tokens
        );
    }

    if let Some(checklist) = report
        .result
        .document()
        .and_then(|doc| doc.checklist().ok())
    {
        eprintln!("{} questions generated", checklist.questions().count());
    }

    Ok(())
}
