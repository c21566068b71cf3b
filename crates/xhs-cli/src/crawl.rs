//! Command handlers. Per-post failures are printed and do not change the exit
//! code; only prerequisite failures (bad input, no listing) return an error.

use std::path::Path;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use xhs_core::{AppConfig, BatchResult, Credential, SaveMode, UserProfile};
use xhs_pipeline::{
    crawl_posts, crawl_user, default_batch_name, fetch_profile, CrawlSettings, PersistReport,
    Persister,
};
use xhs_scraper::XhsClient;

/// Everything a command needs once configuration and credentials are settled.
pub(crate) struct Session<'a> {
    pub client: &'a XhsClient,
    pub config: &'a AppConfig,
    pub credential: &'a Credential,
    pub cancel: &'a CancellationToken,
}

impl Session<'_> {
    pub(crate) async fn run_user(
        &self,
        url: &str,
        mode: SaveMode,
        output: Option<String>,
    ) -> anyhow::Result<()> {
        let settings = CrawlSettings::from_config(self.config);
        let crawl = crawl_user(self.client, &settings, url, self.credential, self.cancel).await?;

        if let Some(profile) = &crawl.profile {
            print_profile_line(profile);
        }
        let name = output.unwrap_or(crawl.output_name);
        let report = self
            .persist(&crawl.result, mode, &name, crawl.profile.as_ref())
            .await?;
        print_outcome(&crawl.result, &report, self.cancel.is_cancelled());
        Ok(())
    }

    pub(crate) async fn run_posts(
        &self,
        urls: &[String],
        mode: SaveMode,
        output: Option<String>,
    ) -> anyhow::Result<()> {
        let settings = CrawlSettings::from_config(self.config);
        let result = crawl_posts(self.client, &settings, urls, self.credential, self.cancel).await?;

        let name = output.unwrap_or_else(default_batch_name);
        let report = self.persist(&result, mode, &name, None).await?;
        print_outcome(&result, &report, self.cancel.is_cancelled());
        Ok(())
    }

    pub(crate) async fn run_profile(&self, url: &str) -> anyhow::Result<()> {
        let profile = fetch_profile(self.client, url, self.credential).await?;
        println!("{}", serde_json::to_string_pretty(&profile)?);
        Ok(())
    }

    async fn persist(
        &self,
        result: &BatchResult,
        mode: SaveMode,
        output_name: &str,
        profile: Option<&UserProfile>,
    ) -> anyhow::Result<PersistReport> {
        let persister =
            Persister::from_config(self.config).context("failed to build media downloader")?;
        Ok(persister
            .persist(&result.successful, mode, output_name, profile)
            .await)
    }
}

/// Merges positional URLs with the contents of `--file`.
///
/// Blank lines and lines starting with `#` in the file are skipped.
///
/// # Errors
///
/// Fails if the file cannot be read or no URL is given at all.
pub(crate) async fn collect_urls(
    mut urls: Vec<String>,
    file: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    if let Some(path) = file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read URL file {}", path.display()))?;
        urls.extend(parse_url_lines(&contents));
    }
    if urls.is_empty() {
        anyhow::bail!("no post URLs given; pass them as arguments or via --file");
    }
    Ok(urls)
}

fn parse_url_lines(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
}

fn print_profile_line(profile: &UserProfile) {
    println!(
        "user {} ({}): {} notes, {} followers",
        profile.user_id,
        profile.nickname.as_deref().unwrap_or("unknown"),
        profile.note_count,
        profile.followed_count
    );
}

fn print_outcome(result: &BatchResult, report: &PersistReport, cancelled: bool) {
    if cancelled {
        println!("interrupted: remaining posts were cancelled");
    }
    println!("{}", result.summary_line());
    for item in &result.failed {
        println!("  failed {}: {}", item.identifier, item.reason());
    }

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("wrote {} -> {}", outcome.sink, outcome.location.display()),
            Some(err) => eprintln!(
                "error: {} sink at {} failed: {err}",
                outcome.sink,
                outcome.location.display()
            ),
        }
    }
    if let Some(media) = &report.media {
        println!(
            "media: {} downloaded, {} failed of {} assets",
            media.downloaded, media.failed, media.attempted
        );
    }
}
