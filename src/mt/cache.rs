//! Cache-first translation with placeholder protection and bounded retries
//!
//! [`CachedTranslator`] wraps a [`MachineTranslator`] for the duration of one
//! target language. Repeated source strings are served from its
//! [`TranslationMemo`]; everything else is masked, sent to the provider with
//! a fixed-interval retry loop, and unmasked. A string that still fails after
//! the last attempt is returned untranslated so the run can carry on.

use crate::mt::error::{MtError, MtResult};
use crate::mt::guard::PlaceholderGuard;
use crate::mt::translator::MachineTranslator;
use std::collections::HashMap;
use std::time::Duration;

/// Source string -> translated string, for one target language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMemo {
    entries: HashMap<String, String>,
}

impl TranslationMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn insert(&mut self, source: &str, translated: &str) {
        self.entries
            .insert(source.to_owned(), translated.to_owned());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How often, and how patiently, a failing call is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one
    pub max_attempts: usize,
    /// Pause between two attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);

    pub fn new(max_attempts: usize, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BACKOFF)
    }
}

/// A source string that could not be translated, with the last error seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFailure {
    pub text: String,
    pub error: MtError,
}

/// Per-language translation front end
pub struct CachedTranslator<'a> {
    provider: &'a dyn MachineTranslator,
    guard: &'a PlaceholderGuard,
    retry: RetryPolicy,
    memo: TranslationMemo,
    failures: Vec<TranslationFailure>,
}

impl<'a> CachedTranslator<'a> {
    /// Create a translator with an empty memo
    pub fn new(
        provider: &'a dyn MachineTranslator,
        guard: &'a PlaceholderGuard,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            guard,
            retry,
            memo: TranslationMemo::new(),
            failures: Vec::new(),
        }
    }

    /// Translate `text`, falling back to `text` itself when every attempt fails
    ///
    /// Successful results are memoized; failures are not, so a later key with
    /// the same source string gets a fresh set of attempts.
    pub async fn translate(&mut self, text: &str, source_locale: &str, target_locale: &str) -> String {
        if let Some(cached) = self.memo.get(text) {
            tracing::debug!("Cache hit for '{}'", text);
            return cached.to_owned();
        }

        match self.translate_with_retry(text, source_locale, target_locale).await {
            Ok(translated) => {
                self.memo.insert(text, &translated);
                translated
            }
            Err(error) => {
                tracing::warn!("Unable to translate '{}': {}", text, error);
                self.failures.push(TranslationFailure {
                    text: text.to_owned(),
                    error,
                });
                text.to_owned()
            }
        }
    }

    async fn translate_with_retry(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let masked = self.guard.mask(text);
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            match self
                .provider
                .translate(&masked.text, source_locale, target_locale)
                .await
            {
                Ok(translated) => return Ok(self.guard.unmask(&translated, &masked)),
                Err(error) => {
                    tracing::debug!(
                        "{} attempt {}/{} failed: {}",
                        self.provider.provider_name(),
                        attempt,
                        self.retry.max_attempts,
                        error
                    );
                    last_error = Some(error);
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MtError::TranslationError("no translation attempt was made".to_string())))
    }

    pub fn memo(&self) -> &TranslationMemo {
        &self.memo
    }

    pub fn failures(&self) -> &[TranslationFailure] {
        &self.failures
    }
}
