//! HTTP mirror implementation

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

use crate::config::FETCH_TIMEOUT_SECS;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

const BAR_TEMPLATE: &str = "{msg:12} [{bar:50}] {percent:>3}% {bytes}/{total_bytes}";
const SPINNER_TEMPLATE: &str = "{msg:12} {spinner} {bytes}";

/// Upper bound for the buffer reserved up front from `Content-Length`
const MAX_PREALLOCATED_BYTES: u64 = 64 << 20;

/// Registry implementation downloading databases from a pacman mirror
pub struct MirrorRegistry {
    client: reqwest::Client,
    progress: MultiProgress,
}

impl MirrorRegistry {
    /// Creates a new MirrorRegistry without visible progress output
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("update-monitor/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Draw download progress on the given progress group
    pub fn with_progress(mut self, progress: MultiProgress) -> Self {
        self.progress = progress;
        self
    }

    fn progress_bar(&self, url: &str, total: Option<u64>) -> ProgressBar {
        let bar = match total {
            Some(len) => ProgressBar::new(len).with_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            ),
            None => ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            ),
        };
        let file_name = url.rsplit('/').next().unwrap_or(url).to_string();
        self.progress.add(bar.with_message(file_name))
    }
}

/// Buffer size to reserve for a body announcing `content_length` bytes.
///
/// The announced length is only a hint from the server, so it is capped.
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.map_or(0, |len| len.min(MAX_PREALLOCATED_BYTES) as usize)
}

impl Default for MirrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Registry for MirrorRegistry {
    async fn fetch_database(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            warn!("Mirror returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let total = response.content_length();
        let bar = self.progress_bar(url, total);

        let mut body = Vec::with_capacity(initial_capacity(total));
        while let Some(chunk) = response.chunk().await? {
            bar.inc(chunk.len() as u64);
            body.extend_from_slice(&chunk);
        }
        bar.finish();

        info!("Downloaded {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
