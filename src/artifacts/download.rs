// Artifact download from Google Drive.
//
// A manifest maps artifact file names to Drive file ids. Each missing file is
// fetched with a bounded number of attempts; large files answer the first
// request with an HTML "can't scan for viruses" page, in which case the
// confirmation token is pulled out of the page and the request repeated.
//
// Failures are logged and counted, never raised: the serving commands check
// for the files themselves and tell the operator what is missing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex_lite::Regex;
use reqwest::Client;
use tracing::{error, info, warn};

use super::file_present;

const DRIVE_URL: &str = "https://drive.google.com/uc";
const DRIVE_CONFIRM_URL: &str = "https://drive.usercontent.google.com/download";

/// How many times to try each file, and how long to wait between tries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            pause: Duration::from_secs(2),
        }
    }
}

/// Outcome of a `download_all` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl DownloadSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read a manifest: a JSON object of `{"file name": "drive file id"}`.
pub fn load_manifest(path: &Path) -> Result<BTreeMap<String, String>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact manifest {}", path.display()))?;
    let manifest: BTreeMap<String, String> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse artifact manifest {}", path.display()))?;

    if let Some(name) = manifest
        .keys()
        .find(|name| name.is_empty() || name.contains(['/', '\\']) || name.as_str() == "..")
    {
        anyhow::bail!("Manifest entry {name:?} is not a plain file name");
    }
    Ok(manifest)
}

pub struct DriveDownloader {
    client: Client,
    drive_url: String,
    confirm_url: String,
    policy: RetryPolicy,
}

impl DriveDownloader {
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        Self::with_urls(DRIVE_URL, DRIVE_CONFIRM_URL, policy)
    }

    /// Downloader against non-default endpoints.
    pub fn with_urls(drive_url: &str, confirm_url: &str, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client for downloads")?;
        Ok(Self {
            client,
            drive_url: drive_url.to_string(),
            confirm_url: confirm_url.to_string(),
            policy,
        })
    }

    /// Fetch every manifest entry that isn't already present in `dir`.
    ///
    /// Only fails if the directory itself can't be created.
    pub async fn download_all(
        &self,
        dir: &Path,
        manifest: &BTreeMap<String, String>,
    ) -> Result<DownloadSummary> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create artifact directory: {}", dir.display()))?;

        let mut summary = DownloadSummary::default();

        for (name, file_id) in manifest {
            let dest = dir.join(name);
            if file_present(&dest) {
                info!(file = %name, "Artifact already exists, skipping");
                println!("  {name} (already exists)");
                summary.skipped.push(name.clone());
                continue;
            }

            println!("  Downloading {name}...");
            if self.download_with_retry(file_id, &dest).await {
                summary.downloaded.push(name.clone());
            } else {
                error!(file = %name, attempts = self.policy.attempts, "Failed to download artifact");
                summary.failed.push(name.clone());
            }
        }

        Ok(summary)
    }

    /// Try to download one file up to `policy.attempts` times.
    pub async fn download_with_retry(&self, file_id: &str, dest: &Path) -> bool {
        let attempts = self.policy.attempts.max(1);
        for attempt in 1..=attempts {
            match self.download_file(file_id, dest).await {
                Ok(bytes) if bytes > 0 && file_present(dest) => {
                    info!(file = %dest.display(), bytes, attempt, "Downloaded artifact");
                    return true;
                }
                Ok(_) => {
                    warn!(file = %dest.display(), attempt, "Download finished but file is empty");
                }
                Err(e) => {
                    warn!(file = %dest.display(), attempt, error = %e, "Download attempt failed");
                }
            }
            let _ = std::fs::remove_file(dest);
            let _ = std::fs::remove_file(part_path(dest));
            if attempt < attempts {
                tokio::time::sleep(self.policy.pause).await;
            }
        }
        false
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(&self.drive_url)
            .query(&[("export", "download"), ("id", file_id)])
            .send()
            .await
            .with_context(|| format!("Failed to request Drive file {file_id}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Download failed with status {} for {file_id}", response.status());
        }

        let response = if is_html(&response) {
            // Large file: Drive wants a confirmation before serving it
            let page = response
                .text()
                .await
                .context("Failed to read Drive confirmation page")?;
            let confirm = parse_confirmation(&page);
            let mut query = vec![
                ("id", file_id.to_string()),
                ("export", "download".to_string()),
                ("confirm", confirm.token),
            ];
            if let Some(uuid) = confirm.uuid {
                query.push(("uuid", uuid));
            }

            let confirmed = self
                .client
                .get(&self.confirm_url)
                .query(&query)
                .send()
                .await
                .with_context(|| format!("Failed to confirm Drive download {file_id}"))?;
            if !confirmed.status().is_success() {
                anyhow::bail!(
                    "Confirmed download failed with status {} for {file_id}",
                    confirmed.status()
                );
            }
            if is_html(&confirmed) {
                anyhow::bail!("Drive returned an HTML page instead of {file_id}; is the file shared?");
            }
            confirmed
        } else {
            response
        };

        write_body(response, dest).await
    }
}

/// Stream a response body into `dest` via a `.part` file, with a progress bar.
async fn write_body(mut response: reqwest::Response, dest: &Path) -> Result<u64> {
    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .context("Invalid progress bar template")?
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .context("Invalid progress bar template")?,
            );
            pb
        }
    };

    let part = part_path(dest);
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        body.extend_from_slice(&chunk);
        pb.set_position(body.len() as u64);
    }
    pb.finish_and_clear();

    std::fs::write(&part, &body).with_context(|| format!("Failed to write {}", part.display()))?;
    std::fs::rename(&part, dest)
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;

    Ok(body.len() as u64)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

#[derive(Debug, PartialEq, Eq)]
struct Confirmation {
    token: String,
    uuid: Option<String>,
}

/// Pull the confirm token (and uuid, on the newer page layout) out of Drive's
/// virus-scan warning page. Falls back to `confirm=t`, which Drive accepts.
fn parse_confirmation(page: &str) -> Confirmation {
    let capture = |pattern: &str| {
        Regex::new(pattern)
            .ok()
            .and_then(|re| re.captures(page))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let token = capture(r#"confirm=([0-9A-Za-z_\-]+)"#)
        .or_else(|| capture(r#"name="confirm"\s+value="([0-9A-Za-z_\-]+)""#))
        .unwrap_or_else(|| "t".to_string());
    let uuid = capture(r#"name="uuid"\s+value="([0-9A-Za-z_\-]+)""#);

    Confirmation { token, uuid }
}
