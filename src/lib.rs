//! Keeps localized JSON translation files in sync with their English source.
//!
//! Each run compares the working copy of every locale file with the files of
//! the last published release and machine-translates only the strings that
//! are new or whose English text changed, leaving hand-edited translations
//! alone. Template placeholders and fixed tokens are protected from the
//! translation service.
//!
//! # Workflow Example
//!
//! ```ignore
//! use translate_diff::{GitHubReleases, LocaleSync, SyncOptions};
//! use translate_diff::mt::{AzureTranslator, PlaceholderGuard, PlaceholderSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = AzureTranslator::new(key, "westeurope".to_string())?;
//!     let releases = GitHubReleases::new("global-121/121-platform", "interfaces/Portal/src/assets/i18n")?;
//!     let guard = PlaceholderGuard::new(PlaceholderSpec::portal_default()?)?;
//!
//!     let sync = LocaleSync::new(&translator, &releases, guard, SyncOptions::new("src/assets/i18n"));
//!     for report in sync.run().await? {
//!         println!("{}: {:?}", report.language, report.outcome);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod mt;
pub mod release;
pub mod sync;
pub mod tree;


pub use error::{SyncError, SyncResult};
pub use release::{DirectoryReleases, GitHubReleases, ReleaseSource};
pub use sync::{
    LanguageOutcome, LanguageReport, LocaleSync, SnapshotPair, SyncOptions, TranslateReason,
    keys_to_translate, translation_reason,
};
pub use tree::{CodecError, DEFAULT_SEPARATOR, FlatLocale, LocaleNode, LocaleTree, flatten, nest};
