/// Machine Translation Module
///
/// This module turns a source string into its translation while keeping
/// protected text intact and limiting calls to the external service.
///
/// # Overview
///
/// 1. **MT Trait & Providers** - `MachineTranslator`, with the Azure AI Translator provider and a mock
/// 2. **Placeholder Guard** - masks fixed tokens and `{{ ... }}` placeholders before translation
/// 3. **Cached Translator** - per-language memo, bounded retry, fall back to the source text
///
/// # Example
///
/// ```ignore
/// use translate_diff::mt::{
///     AzureTranslator, CachedTranslator, PlaceholderGuard, PlaceholderSpec, RetryPolicy,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = AzureTranslator::new(key, "westeurope".to_string())?;
///     let guard = PlaceholderGuard::new(PlaceholderSpec::portal_default()?)?;
///
///     let mut translator = CachedTranslator::new(&provider, &guard, RetryPolicy::default());
///     let text = translator.translate("Hello {{name}}", "en", "fr").await;
///
///     println!("{}", text); // "Bonjour {{name}}"
///     Ok(())
/// }
/// ```
pub mod azure;
pub mod cache;
pub mod error;
pub mod guard;
pub mod mock;
pub mod translator;

pub use azure::AzureTranslator;
pub use cache::{CachedTranslator, RetryPolicy, TranslationFailure, TranslationMemo};
pub use error::{MtError, MtResult};
pub use guard::{MaskedText, PlaceholderGuard, PlaceholderSpec, ProtectedPattern};
pub use mock::{MockMode, MockTranslator};
pub use translator::MachineTranslator;
