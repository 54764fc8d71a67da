//! Azure AI Translator provider for machine translation
//!
//! This module integrates with the Azure AI Translator v3 REST API.
//!
//! # Authentication
//!
//! Requests carry the subscription key and the resource region as
//! `Ocp-Apim-Subscription-Key` / `Ocp-Apim-Subscription-Region` headers.
//! Every request also gets a fresh `X-ClientTraceId` so failed calls can be
//! looked up on the Azure side.
//!
//! # Example
//!
//! ```ignore
//! use translate_diff::mt::{AzureTranslator, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AzureTranslator::new(key, "westeurope".to_string())?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

/// One entry of the response array, matching one input text
#[derive(Debug, Deserialize)]
struct TranslateResponseItem {
    translations: Vec<TranslationText>,
}

#[derive(Debug, Deserialize)]
struct TranslationText {
    text: String,
}

/// Azure AI Translator v3 provider
#[derive(Clone)]
pub struct AzureTranslator {
    /// Subscription key
    api_key: String,
    /// Azure region of the translator resource, e.g. "westeurope"
    region: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL of the translator service
    base_url: String,
}

impl AzureTranslator {
    /// Global Azure AI Translator endpoint
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.cognitive.microsofttranslator.com";

    /// API version sent with every request
    const API_VERSION: &'static str = "3.0";

    /// Maximum characters per request (Azure limit for a single call)
    const MAX_CHARS_PER_STRING: usize = 50_000;

    /// Create a provider against the global endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the key or region is empty or the HTTP client cannot be built
    pub fn new(api_key: String, region: String) -> MtResult<Self> {
        Self::with_endpoint(api_key, region, Self::DEFAULT_ENDPOINT.to_string())
    }

    /// Create a provider against a custom endpoint (regional or private)
    pub fn with_endpoint(api_key: String, region: String, base_url: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }
        if region.trim().is_empty() {
            return Err(MtError::ConfigError("Region cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            region,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map a non-success status to the matching error
    fn status_error(status: StatusCode, body: String) -> MtError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            MtError::RateLimited(body)
        } else if status.is_client_error() {
            MtError::ConfigError(format!("API client error ({}): {}", status, body))
        } else {
            MtError::TranslationError(format!("API server error ({}): {}", status, body))
        }
    }

    /// Extract the single translated text from a response body
    fn parse_response(body: &str) -> MtResult<String> {
        let items: Vec<TranslateResponseItem> = serde_json::from_str(body).map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid API response: missing 'translations[0].text'".to_string(),
                )
            })
    }
}

impl std::fmt::Debug for AzureTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTranslator")
            .field("api_key", &"***")
            .field("region", &self.region)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for AzureTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        // Locale codes are validated above, safe to put in the query string as-is
        let url = format!(
            "{}/translate?api-version={}&from={}&to={}",
            self.base_url,
            Self::API_VERSION,
            normalize_locale(source_locale),
            normalize_locale(target_locale)
        );

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .header("X-ClientTraceId", uuid::Uuid::new_v4().to_string())
            .json(&json!([{ "Text": text }]))
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(Self::status_error(status, body));
        }

        Self::parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "Azure AI Translator"
    }
}
