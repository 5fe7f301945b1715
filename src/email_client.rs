use crate::errors::AppError;
use serde::{Deserialize, Serialize};

/// A fully composed email ready for the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Client for a Resend-compatible transactional email API.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EmailClient {
    /// Creates a new `EmailClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The provider's API root, e.g. `https://api.resend.com`.
    /// * `api_key` - The API key used as bearer token.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Sends one email.
    ///
    /// # Returns
    ///
    /// * `Result<Option<String>, AppError>` - The provider's message id, when it returns one.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, AppError> {
        let url = format!("{}/emails", self.base_url);
        tracing::debug!("Sending email '{}' to {} recipient(s)", email.subject, email.to.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(email)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Email request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Email provider returned {}: {}",
                status, error_text
            )));
        }

        let data: SendEmailResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse email provider response: {}", e))
        })?;

        Ok(data.id)
    }
}
