use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use translate_diff::config::{Config, build_cli};
use translate_diff::mt::{
    AzureTranslator, MachineTranslator, MockMode, MockTranslator, PlaceholderGuard,
    PlaceholderSpec,
};
use translate_diff::{DirectoryReleases, GitHubReleases, LanguageOutcome, LocaleSync, ReleaseSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Variables from .env only fill in what the environment does not set
    dotenvy::dotenv().ok();

    let matches = build_cli().get_matches();
    let config = Config::from_matches(&matches)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    let translator: Box<dyn MachineTranslator> = if config.use_mock {
        Box::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let key = config.api_key.clone().ok_or("missing translator key")?;
        Box::new(AzureTranslator::new(key, config.region.clone())?)
    };

    let releases: Box<dyn ReleaseSource> = match &config.baseline {
        Some(dir) => Box::new(DirectoryReleases::new(dir)),
        None => Box::new(GitHubReleases::new(&config.repo, &config.remote_path)?),
    };

    let guard = PlaceholderGuard::new(PlaceholderSpec::portal_default()?)?;

    info!("Translating with {}", translator.provider_name());
    let sync = LocaleSync::new(
        translator.as_ref(),
        releases.as_ref(),
        guard,
        config.sync_options(),
    );
    let reports = sync.run().await?;

    for report in &reports {
        if !report.failures.is_empty() {
            warn!(
                "{}: {} of {} strings left untranslated",
                report.language,
                report.failures.len(),
                report.translated_keys.len()
            );
        }
        if report.outcome == LanguageOutcome::WouldUpdate {
            println!(
                "{}.json would change ({} keys translated)",
                report.language,
                report.translated_keys.len()
            );
        }
    }

    Ok(())
}
