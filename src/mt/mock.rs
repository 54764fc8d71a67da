//! Mock Machine Translator for testing and offline runs
//!
//! This module provides a deterministic, API-free translator. It backs the
//! `--mock` CLI mode and lets the sync pipeline be tested without API keys
//! or network access.
//!
//! # Example
//!
//! ```ignore
//! use translate_diff::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    /// This preserves placeholder markers perfectly for testing
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of words separated by spaces, to check that markers
    /// are restored after being moved
    Reorder,

    /// Every call fails with this message
    Error(String),
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the same call counter, so a test can hand a clone to the
/// pipeline and inspect how many calls reached the "service".
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Number of initial calls that fail before `mode` takes over
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            failures: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the first `failures` calls fail with a network error
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::Suffix).with_failures(2);
    /// // calls 1 and 2 fail, call 3 returns "hello_fr"
    /// ```
    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    /// Number of `translate` calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().collect();
                Ok(words.into_iter().rev().collect::<Vec<_>>().join(" "))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(MtError::NetworkError(format!(
                "simulated failure {} of {}",
                call + 1,
                self.failures
            )));
        }

        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_suffix_preserves_markers() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let text = "808002001 sent 808002002 message";
        let result = mock.translate(text, "en", "fr").await.unwrap();
        assert_eq!(result, "808002001 sent 808002002 message_fr");
    }

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mut map = HashMap::new();
        map.insert(
            ("hello".to_string(), "fr".to_string()),
            "bonjour".to_string(),
        );

        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "bonjour");
        // Unknown mapping falls back to suffix mode
        assert_eq!(mock.translate("unknown", "en", "fr").await.unwrap(), "unknown_fr");
    }

    #[tokio::test]
    async fn test_reorder_reverses_words() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock.translate("808002001 sent 808002002", "en", "ja").await.unwrap();
        assert_eq!(result, "808002002 sent 808002001");
    }

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", "en", "fr").await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failures_then_success() {
        let mock = MockTranslator::new(MockMode::Suffix).with_failures(2);
        assert!(matches!(
            mock.translate("a", "en", "fr").await,
            Err(MtError::NetworkError(_))
        ));
        assert!(mock.translate("a", "en", "fr").await.is_err());
        assert_eq!(mock.translate("a", "en", "fr").await.unwrap(), "a_fr");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_call_counter() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let handle = mock.clone();
        mock.translate("a", "en", "fr").await.unwrap();
        mock.translate("b", "en", "fr").await.unwrap();
        assert_eq!(handle.calls(), 2);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
