//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the sync pipeline can run against Azure AI Translator or the offline
//! mock without knowing which one it talks to.
//!
//! # Example
//!
//! ```ignore
//! use translate_diff::mt::{AzureTranslator, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AzureTranslator::new("api-key".to_string(), "westeurope".to_string())?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour, le monde!"
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations perform exactly one attempt per call. Caching, masking of
/// protected text and retries are layered on top by
/// [`CachedTranslator`](crate::mt::cache::CachedTranslator).
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "fr", "pt-BR")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If the call failed; the caller decides whether to retry
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Name of this provider, for logs
    fn provider_name(&self) -> &str;
}

/// Normalize a locale file stem into the code the translation service expects
///
/// File names use `_` or `-` and arbitrary case (`pt_BR.json`, `zh-hans.json`);
/// the service wants BCP 47 style with a lowercase language subtag:
/// - `pt_BR` → `pt-BR`
/// - `EN` → `en`
/// - `zh-Hans` → `zh-Hans`
pub fn normalize_locale(locale: &str) -> String {
    let mut parts = locale.split(['-', '_']);
    let language = parts.next().unwrap_or(locale).to_lowercase();

    std::iter::once(language)
        .chain(parts.map(str::to_string))
        .collect::<Vec<_>>()
        .join("-")
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code is non-empty and contains only alphanumeric
/// characters, hyphens, and underscores.
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("pt_BR")?; // OK
/// validate_locale("invalid@code").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
