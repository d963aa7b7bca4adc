use crate::error::{ChecklistError, Result};
use reqwest::Response;
use tracing::error;

/// Convert a reqwest error to a ChecklistError, handling timeout errors specially.
pub fn handle_http_error(e: reqwest::Error, provider_name: &str) -> ChecklistError {
    error!(error = %e, "HTTP request to {} failed", provider_name);
    if e.is_timeout() {
        ChecklistError::Timeout
    } else {
        ChecklistError::HttpError(e)
    }
}

/// Check HTTP response status and extract error message if unsuccessful.
pub async fn check_response_status(response: Response, provider_name: &str) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .map_err(|e| handle_http_error(e, provider_name))?;
        error!(
            status = %status,
            error = %error_text,
            "{} API returned error response", provider_name
        );
        return Err(ChecklistError::ApiError(format!(
            "{} API error ({}): {}",
            provider_name,
            status.as_u16(),
            error_text
        )));
    }
    Ok(response)
}
