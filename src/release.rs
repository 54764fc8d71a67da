//! Sources for the "previous release" snapshots
//!
//! The diff needs the locale files as they were last published. They come
//! from GitHub (release listing + raw file download) or, for offline runs and
//! tests, from a local directory holding a copy of those files.
use crate::error::{SyncError, SyncResult};
use crate::loader::{load_locale_file, parse_locale};
use crate::tree::LocaleTree;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

/// Where previously published locale files are read from
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Identifier of the most recent release, `None` if nothing was released yet
    async fn latest_release(&self) -> SyncResult<Option<String>>;

    /// The locale file of `language` as published in `release`
    async fn fetch_locale(&self, release: &str, language: &str) -> SyncResult<LocaleTree>;
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Releases of a GitHub repository
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    /// `owner/name`
    repo: String,
    /// Directory of the locale files inside the repository
    locale_path: String,
    api_base: String,
    raw_base: String,
}

impl GitHubReleases {
    pub const DEFAULT_REPO: &'static str = "global-121/121-platform";
    pub const DEFAULT_LOCALE_PATH: &'static str = "interfaces/Portal/src/assets/i18n";

    const API_BASE: &'static str = "https://api.github.com";
    const RAW_BASE: &'static str = "https://raw.githubusercontent.com";

    pub fn new(repo: &str, locale_path: &str) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            repo: repo.trim_matches('/').to_string(),
            locale_path: locale_path.trim_matches('/').to_string(),
            api_base: Self::API_BASE.to_string(),
            raw_base: Self::RAW_BASE.to_string(),
        })
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_base, self.repo)
    }

    fn locale_url(&self, release: &str, language: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}.json",
            self.raw_base, self.repo, release, self.locale_path, language
        )
    }

    /// GET `url` and return the body of a successful response
    async fn get_text(&self, url: &str) -> SyncResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Remote(format!("GET {} returned {}", url, status)));
        }
        Ok(response.text().await?)
    }
}

/// Tag of the first (most recent) release in a GitHub release listing
fn parse_latest_tag(body: &str) -> SyncResult<Option<String>> {
    let releases: Vec<Release> =
        serde_json::from_str(body).map_err(|e| SyncError::json("release listing", e))?;
    Ok(releases.into_iter().next().map(|r| r.tag_name))
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn latest_release(&self) -> SyncResult<Option<String>> {
        let url = self.releases_url();
        tracing::debug!("Listing releases from {}", url);
        let body = self.get_text(&url).await?;
        parse_latest_tag(&body)
    }

    async fn fetch_locale(&self, release: &str, language: &str) -> SyncResult<LocaleTree> {
        let url = self.locale_url(release, language);
        tracing::debug!("Fetching {}", url);
        let body = self.get_text(&url).await?;
        parse_locale(&body, &url)
    }
}

/// A local directory standing in for the last release
///
/// Holds `<language>.json` files; the directory itself is the only "release".
#[derive(Debug, Clone)]
pub struct DirectoryReleases {
    dir: PathBuf,
}

impl DirectoryReleases {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReleaseSource for DirectoryReleases {
    async fn latest_release(&self) -> SyncResult<Option<String>> {
        if !self.dir.is_dir() {
            return Err(SyncError::Config(format!(
                "baseline directory not found: {}",
                self.dir.display()
            )));
        }
        Ok(Some(self.dir.display().to_string()))
    }

    async fn fetch_locale(&self, _release: &str, language: &str) -> SyncResult<LocaleTree> {
        load_locale_file(&self.dir.join(format!("{}.json", language)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_github_urls() {
        let source = GitHubReleases::new(
            GitHubReleases::DEFAULT_REPO,
            "/interfaces/Portal/src/assets/i18n/",
        )
        .unwrap();
        assert_eq!(
            source.releases_url(),
            "https://api.github.com/repos/global-121/121-platform/releases"
        );
        assert_eq!(
            source.locale_url("v24.1.0", "fr"),
            "https://raw.githubusercontent.com/global-121/121-platform/v24.1.0/interfaces/Portal/src/assets/i18n/fr.json"
        );
    }

    #[test]
    fn test_parse_latest_tag_takes_first() {
        let body = r#"[{"tag_name": "v2.0.0", "name": "Two"}, {"tag_name": "v1.0.0"}]"#;
        assert_eq!(parse_latest_tag(body).unwrap(), Some("v2.0.0".to_string()));
    }

    #[test]
    fn test_parse_latest_tag_no_releases() {
        assert_eq!(parse_latest_tag("[]").unwrap(), None);
    }

    #[test]
    fn test_parse_latest_tag_rejects_error_body() {
        let body = r#"{"message": "API rate limit exceeded"}"#;
        assert!(matches!(parse_latest_tag(body), Err(SyncError::Json { .. })));
    }

    #[tokio::test]
    async fn test_directory_releases() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fr.json"), r#"{"a": {"b": "c"}}"#).unwrap();
        let source = DirectoryReleases::new(dir.path());

        let release = source.latest_release().await.unwrap().unwrap();
        let tree = source.fetch_locale(&release, "fr").await.unwrap();
        assert_eq!(
            tree,
            LocaleTree::new().with_branch("a", LocaleTree::new().with_leaf("b", "c"))
        );
        assert!(source.fetch_locale(&release, "nl").await.is_err());
    }

    #[tokio::test]
    async fn test_directory_releases_missing_dir() {
        let dir = tempdir().unwrap();
        let source = DirectoryReleases::new(dir.path().join("nope"));
        assert!(matches!(
            source.latest_release().await,
            Err(SyncError::Config(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Needs network access to api.github.com
    async fn test_real_github_latest_release() {
        let source = GitHubReleases::new(
            GitHubReleases::DEFAULT_REPO,
            GitHubReleases::DEFAULT_LOCALE_PATH,
        )
        .unwrap();
        let tag = source.latest_release().await.unwrap();
        assert!(tag.is_some());
    }
}
