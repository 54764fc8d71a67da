//! Command line and environment configuration
//!
//! Every setting can come from a flag; the API key, assets path and region
//! fall back to environment variables, which `main` seeds from a `.env` file.
use crate::error::{SyncError, SyncResult};
use crate::mt::cache::RetryPolicy;
use crate::release::GitHubReleases;
use crate::sync::SyncOptions;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use std::time::Duration;

pub const KEY_ENV: &str = "TRANSLATOR_KEY";
pub const ASSETS_ENV: &str = "ASSETS_PATH";
pub const REGION_ENV: &str = "TRANSLATOR_REGION";
pub const DEFAULT_REGION: &str = "westeurope";

/// Names used by earlier versions of the portal tooling; read when the
/// current names are not set
pub const LEGACY_KEY_ENV: &str = "MSCOGNITIVE_KEY";
pub const LEGACY_ASSETS_ENV: &str = "121_ASSETS_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Translator subscription key; not needed in mock mode
    pub api_key: Option<String>,
    pub assets_dir: PathBuf,
    pub region: String,
    pub source_language: String,
    /// GitHub repository publishing the releases, `owner/name`
    pub repo: String,
    /// Locale directory inside the repository
    pub remote_path: String,
    /// Local stand-in for the last release
    pub baseline: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub use_mock: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

pub fn build_cli() -> Command {
    Command::new("translate-diff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate new and changed strings of the portal's locale files")
        .arg(
            Arg::new("key")
                .long("key")
                .short('k')
                .env(KEY_ENV)
                .hide_env_values(true)
                .help("Azure AI Translator subscription key"),
        )
        .arg(
            Arg::new("assets")
                .long("assets")
                .short('a')
                .env(ASSETS_ENV)
                .value_parser(value_parser!(PathBuf))
                .help("Directory with the locale files to translate (*.json)"),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .env(REGION_ENV)
                .default_value(DEFAULT_REGION)
                .help("Azure region of the translator resource"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .default_value("en")
                .help("Source language; <source>.json is the source of truth"),
        )
        .arg(
            Arg::new("repo")
                .long("repo")
                .default_value(GitHubReleases::DEFAULT_REPO)
                .help("GitHub repository (owner/name) whose latest release is the baseline"),
        )
        .arg(
            Arg::new("remote-path")
                .long("remote-path")
                .default_value(GitHubReleases::DEFAULT_LOCALE_PATH)
                .help("Path of the locale directory inside the repository"),
        )
        .arg(
            Arg::new("baseline")
                .long("baseline")
                .value_parser(value_parser!(PathBuf))
                .help("Use a local directory as the previous release instead of GitHub"),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .value_parser(value_parser!(usize))
                .help("Translation attempts per string before giving up"),
        )
        .arg(
            Arg::new("backoff-secs")
                .long("backoff-secs")
                .value_parser(value_parser!(u64))
                .help("Seconds to wait between two attempts"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Azure AI Translator")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Report what would change without writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Print more output")
                .action(ArgAction::SetTrue),
        )
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> SyncResult<Self> {
        Self::from_matches_with_env(matches, |name| std::env::var(name).ok())
    }

    /// Like [`Config::from_matches`], with `env` resolving the legacy variable names
    pub fn from_matches_with_env(
        matches: &ArgMatches,
        env: impl Fn(&str) -> Option<String>,
    ) -> SyncResult<Self> {
        let use_mock = matches.get_flag("mock");

        let api_key = matches
            .get_one::<String>("key")
            .cloned()
            .or_else(|| env(LEGACY_KEY_ENV))
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() && !use_mock {
            return Err(SyncError::Config(format!(
                "no translator key given; pass --key, set {} or use --mock",
                KEY_ENV
            )));
        }

        let assets_dir = matches
            .get_one::<PathBuf>("assets")
            .cloned()
            .or_else(|| env(LEGACY_ASSETS_ENV).map(PathBuf::from))
            .ok_or_else(|| {
                SyncError::Config(format!("no assets path given; pass --assets or set {}", ASSETS_ENV))
            })?;

        let max_attempts = matches
            .get_one::<usize>("max-attempts")
            .copied()
            .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS);
        let backoff = matches
            .get_one::<u64>("backoff-secs")
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(RetryPolicy::DEFAULT_BACKOFF);

        Ok(Self {
            api_key,
            assets_dir,
            region: string_arg(matches, "region", DEFAULT_REGION),
            source_language: string_arg(matches, "source", "en"),
            repo: string_arg(matches, "repo", GitHubReleases::DEFAULT_REPO),
            remote_path: string_arg(matches, "remote-path", GitHubReleases::DEFAULT_LOCALE_PATH),
            baseline: matches.get_one::<PathBuf>("baseline").cloned(),
            retry: RetryPolicy::new(max_attempts, backoff),
            use_mock,
            dry_run: matches.get_flag("dry-run"),
            verbose: matches.get_flag("verbose"),
        })
    }

    pub fn sync_options(&self) -> SyncOptions {
        let mut options = SyncOptions::new(&self.assets_dir);
        options.source_language = self.source_language.clone();
        options.retry = self.retry;
        options.dry_run = self.dry_run;
        options
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "info" } else { "warn" }
    }
}

fn string_arg(matches: &ArgMatches, id: &str, default: &str) -> String {
    matches
        .get_one::<String>(id)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> SyncResult<Config> {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("translate-diff").chain(args.iter().copied()))
            .unwrap();
        Config::from_matches_with_env(&matches, |_| None)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--key", "secret", "--assets", "/tmp/i18n"]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/i18n"));
        assert_eq!(config.source_language, "en");
        assert_eq!(config.repo, "global-121/121-platform");
        assert_eq!(config.remote_path, "interfaces/Portal/src/assets/i18n");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.baseline, None);
        assert!(!config.use_mock);
        assert!(!config.dry_run);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&[
            "-m",
            "-n",
            "-v",
            "-a",
            "assets",
            "--source",
            "nl",
            "--baseline",
            "release",
            "--max-attempts",
            "3",
            "--backoff-secs",
            "0",
        ])
        .unwrap();
        assert!(config.use_mock);
        assert!(config.dry_run);
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.baseline, Some(PathBuf::from("release")));
        assert_eq!(config.retry, RetryPolicy::new(3, Duration::ZERO));

        let options = config.sync_options();
        assert_eq!(options.source_language, "nl");
        assert!(options.dry_run);
        assert_eq!(options.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_mock_does_not_need_key() {
        let config = parse(&["--mock", "--assets", "a"]).unwrap();
        assert!(config.use_mock);
    }

    #[test]
    fn test_blank_key_without_mock_is_rejected() {
        assert!(matches!(
            parse(&["--key", "  ", "--assets", "a"]),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn test_legacy_env_names_are_read() {
        let matches = build_cli().try_get_matches_from(["translate-diff"]).unwrap();
        let config = Config::from_matches_with_env(&matches, |name| match name {
            "MSCOGNITIVE_KEY" => Some("old-secret".to_string()),
            "121_ASSETS_PATH" => Some("portal/i18n".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("old-secret"));
        assert_eq!(config.assets_dir, PathBuf::from("portal/i18n"));
    }

    #[test]
    fn test_flags_win_over_legacy_env_names() {
        let matches = build_cli()
            .try_get_matches_from(["translate-diff", "--key", "new", "--assets", "a"])
            .unwrap();
        let config =
            Config::from_matches_with_env(&matches, |_| Some("old".to_string())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("new"));
        assert_eq!(config.assets_dir, PathBuf::from("a"));
    }

    #[test]
    fn test_retry_defaults_come_from_policy() {
        let config = parse(&["--mock", "--assets", "a"]).unwrap();
        assert_eq!(config.retry.max_attempts, RetryPolicy::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.retry.backoff, RetryPolicy::DEFAULT_BACKOFF);
    }

    #[test]
    fn test_invalid_attempts_rejected_by_parser() {
        let result = build_cli().try_get_matches_from(["translate-diff", "--max-attempts", "many"]);
        assert!(result.is_err());
    }
}
