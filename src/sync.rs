//! Diff-driven synchronization of target locale files
//!
//! For every target language the pipeline runs through the same stages:
//!
//! 1. **Loaded** - working copy from disk, previous release from the [`ReleaseSource`]
//! 2. **Diffed** - [`keys_to_translate`] picks the keys whose translation is missing or stale
//! 3. **Translated** - those keys go through a fresh [`CachedTranslator`]
//! 4. **Reassembled** - the flat map is nested back into a tree
//! 5. **Written** or **Skipped** - the file is only rewritten when the tree changed
//!
//! Languages are processed one after the other; nothing but the read-only
//! placeholder table is shared between them.
use crate::error::SyncResult;
use crate::loader::{discover_languages, load_locale_file, write_locale_file};
use crate::mt::cache::{CachedTranslator, RetryPolicy, TranslationFailure};
use crate::mt::guard::PlaceholderGuard;
use crate::mt::translator::MachineTranslator;
use crate::release::ReleaseSource;
use crate::tree::{DEFAULT_SEPARATOR, FlatLocale, flatten, nest};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Previous-release and working-copy snapshots of one language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotPair {
    /// As published in the last release (empty when unavailable)
    pub old: FlatLocale,
    /// As found in the working copy
    pub new: FlatLocale,
}

/// Why a key is sent to translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateReason {
    /// The source key did not exist in the last release
    NewKey,
    /// The target working copy has no value for the key
    MissingInTarget,
    /// The target file of the last release had no value for the key
    MissingInRelease,
    /// Source text changed and the target was not edited by hand since the release
    SourceChanged,
}

/// Decide whether `key` must be (re)translated
///
/// `en` holds the source snapshots and `ln` the target snapshots. A target
/// value that differs from the released one was edited by hand and is kept,
/// even when the source text changed.
pub fn translation_reason(key: &str, en: &SnapshotPair, ln: &SnapshotPair) -> Option<TranslateReason> {
    let en_new = en.new.get(key)?;

    let Some(en_old) = en.old.get(key) else {
        return Some(TranslateReason::NewKey);
    };
    let Some(ln_new) = ln.new.get(key) else {
        return Some(TranslateReason::MissingInTarget);
    };
    let Some(ln_old) = ln.old.get(key) else {
        return Some(TranslateReason::MissingInRelease);
    };

    (en_new != en_old && ln_new == ln_old).then_some(TranslateReason::SourceChanged)
}

/// All source keys needing translation, in key order
pub fn keys_to_translate<'a>(en: &'a SnapshotPair, ln: &SnapshotPair) -> Vec<(&'a str, TranslateReason)> {
    en.new
        .keys()
        .filter_map(|key| translation_reason(key, en, ln).map(|reason| (key.as_str(), reason)))
        .collect()
}

/// What happened to a language's file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// Content changed and the file was rewritten
    Updated,
    /// Content changed, but this is a dry run
    WouldUpdate,
    /// Nothing changed, the file was not touched
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageReport {
    pub language: String,
    /// Keys that were sent to translation
    pub translated_keys: Vec<String>,
    /// Source strings left untranslated after all retries
    pub failures: Vec<TranslationFailure>,
    pub outcome: LanguageOutcome,
}

/// Settings for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory holding `<language>.json` files
    pub assets_dir: PathBuf,
    /// Language of the source-of-truth file
    pub source_language: String,
    pub separator: String,
    pub retry: RetryPolicy,
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            source_language: "en".to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }
}

/// Keeps the target locale files of an assets directory in sync with the source file
pub struct LocaleSync<'a> {
    translator: &'a dyn MachineTranslator,
    releases: &'a dyn ReleaseSource,
    guard: PlaceholderGuard,
    options: SyncOptions,
}

impl<'a> LocaleSync<'a> {
    pub fn new(
        translator: &'a dyn MachineTranslator,
        releases: &'a dyn ReleaseSource,
        guard: PlaceholderGuard,
        options: SyncOptions,
    ) -> Self {
        Self {
            translator,
            releases,
            guard,
            options,
        }
    }

    /// Sync every target language found in the assets directory
    ///
    /// Problems with the working files or the source release are fatal;
    /// a missing target file in the release only widens what gets translated.
    pub async fn run(&self) -> SyncResult<Vec<LanguageReport>> {
        let options = &self.options;
        let languages = discover_languages(&options.assets_dir, &options.source_language)?;
        info!("Found languages: {:?}", languages);

        let source_path = options
            .assets_dir
            .join(format!("{}.json", options.source_language));
        let source_new = flatten(&load_locale_file(&source_path)?, &options.separator);

        let release = self.releases.latest_release().await?;
        let source_old = match &release {
            Some(release) => {
                info!("Comparing against release {}", release);
                let tree = self
                    .releases
                    .fetch_locale(release, &options.source_language)
                    .await?;
                flatten(&tree, &options.separator)
            }
            None => {
                warn!("No previous release found, every key will be translated");
                FlatLocale::new()
            }
        };

        let source = SnapshotPair {
            old: source_old,
            new: source_new,
        };

        let mut reports = Vec::with_capacity(languages.len());
        for language in &languages {
            reports.push(
                self.sync_language(language, &source, release.as_deref())
                    .await?,
            );
        }
        Ok(reports)
    }

    /// Sync a single target language against the source snapshots
    pub async fn sync_language(
        &self,
        language: &str,
        source: &SnapshotPair,
        release: Option<&str>,
    ) -> SyncResult<LanguageReport> {
        let options = &self.options;
        info!("Checking translation {} --> {}", options.source_language, language);

        let path = options.assets_dir.join(format!("{}.json", language));
        let current = load_locale_file(&path)?;
        let previous = match release {
            Some(release) => match self.releases.fetch_locale(release, language).await {
                Ok(tree) => flatten(&tree, &options.separator),
                Err(e) => {
                    warn!(
                        "No usable {}.json in release {}, treating it as empty: {}",
                        language, release, e
                    );
                    FlatLocale::new()
                }
            },
            None => FlatLocale::new(),
        };
        let mut target = SnapshotPair {
            old: previous,
            new: flatten(&current, &options.separator),
        };

        let pending = keys_to_translate(source, &target);
        debug!("{}: {} keys to translate", language, pending.len());

        let mut translator = CachedTranslator::new(self.translator, &self.guard, options.retry);
        let mut translated_keys = Vec::with_capacity(pending.len());
        for (key, reason) in pending {
            let Some(text) = source.new.get(key) else {
                continue;
            };
            debug!("{}: translating '{}' ({:?})", language, key, reason);
            let translated = translator
                .translate(text, &options.source_language, language)
                .await;
            target.new.insert(key.to_string(), translated);
            translated_keys.push(key.to_string());
        }

        let reassembled = nest(&target.new, &options.separator)?;

        let outcome = if reassembled == current {
            info!("{}.json is up to date", language);
            LanguageOutcome::Unchanged
        } else if options.dry_run {
            info!("{}.json would be updated (dry run)", language);
            LanguageOutcome::WouldUpdate
        } else {
            write_locale_file(&path, &reassembled)?;
            info!("{}.json has been updated", language);
            LanguageOutcome::Updated
        };

        Ok(LanguageReport {
            language: language.to_string(),
            translated_keys,
            failures: translator.failures().to_vec(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(entries: &[(&str, &str)]) -> FlatLocale {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pair(old: &[(&str, &str)], new: &[(&str, &str)]) -> SnapshotPair {
        SnapshotPair {
            old: flat(old),
            new: flat(new),
        }
    }

    #[test]
    fn test_new_key_is_translated() {
        let en = pair(&[], &[("x", "hello")]);
        let ln = pair(&[], &[]);
        assert_eq!(
            translation_reason("x", &en, &ln),
            Some(TranslateReason::NewKey)
        );
    }

    #[test]
    fn test_key_missing_in_target_is_translated() {
        let en = pair(&[("x", "hello")], &[("x", "hello")]);
        let ln = pair(&[("x", "salut")], &[]);
        assert_eq!(
            translation_reason("x", &en, &ln),
            Some(TranslateReason::MissingInTarget)
        );
    }

    #[test]
    fn test_key_missing_in_release_is_translated() {
        let en = pair(&[("x", "hello")], &[("x", "hello")]);
        let ln = pair(&[], &[("x", "salut")]);
        assert_eq!(
            translation_reason("x", &en, &ln),
            Some(TranslateReason::MissingInRelease)
        );
    }

    #[test]
    fn test_changed_source_untouched_target_is_retranslated() {
        let en = pair(&[("x", "hi")], &[("x", "hello")]);
        let ln = pair(&[("x", "salut")], &[("x", "salut")]);
        assert_eq!(
            translation_reason("x", &en, &ln),
            Some(TranslateReason::SourceChanged)
        );
    }

    #[test]
    fn test_hand_edited_target_is_preserved() {
        let en = pair(&[("x", "hi")], &[("x", "hello")]);
        let ln = pair(&[("x", "salut")], &[("x", "bonjour")]);
        assert_eq!(translation_reason("x", &en, &ln), None);
    }

    #[test]
    fn test_unchanged_source_is_kept() {
        let en = pair(&[("x", "hello")], &[("x", "hello")]);
        let ln = pair(&[("x", "salut")], &[("x", "salut")]);
        assert_eq!(translation_reason("x", &en, &ln), None);
    }

    #[test]
    fn test_key_not_in_source_is_ignored() {
        let en = pair(&[], &[]);
        let ln = pair(&[], &[("legacy", "ancien")]);
        assert_eq!(translation_reason("legacy", &en, &ln), None);
    }

    #[test]
    fn test_empty_release_translates_everything() {
        let en = pair(&[], &[("a", "A"), ("b.c", "C")]);
        let ln = pair(&[], &[("a", "a-fr"), ("b.c", "c-fr")]);
        let keys: Vec<&str> = keys_to_translate(&en, &ln).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b.c"]);
    }

    #[test]
    fn test_keys_to_translate_mixed() {
        let en = pair(
            &[("same", "Same"), ("changed", "Old"), ("edited", "Old")],
            &[
                ("same", "Same"),
                ("changed", "New"),
                ("edited", "New"),
                ("added", "Added"),
            ],
        );
        let ln = pair(
            &[("same", "Pareil"), ("changed", "Vieux"), ("edited", "Vieux")],
            &[("same", "Pareil"), ("changed", "Vieux"), ("edited", "Retouché")],
        );

        assert_eq!(
            keys_to_translate(&en, &ln),
            vec![
                ("added", TranslateReason::NewKey),
                ("changed", TranslateReason::SourceChanged),
            ]
        );
    }

    #[test]
    fn test_sync_options_defaults() {
        let options = SyncOptions::new("assets");
        assert_eq!(options.source_language, "en");
        assert_eq!(options.separator, ".");
        assert_eq!(options.retry, RetryPolicy::default());
        assert!(!options.dry_run);
    }
}
