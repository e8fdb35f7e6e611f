use async_trait::async_trait;
use futures_util::{stream, StreamExt};

use collator_core::{BatchOutcome, MediaItem};
use stage_logging::{stage_info, stage_warn};

use crate::settings::HttpSettings;
use crate::store::ArtifactStore;
use crate::types::{map_reqwest_error, FailureKind, FetchError};

/// Downloads one resource body. Seam for tests.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDownloader {
    settings: HttpSettings,
}

impl ReqwestDownloader {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}

/// Artifact extension derived from a download URL; `.jpg` when the URL's
/// last path segment carries no extension.
fn artifact_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < segment.len() => segment[idx..].to_string(),
        _ => ".jpg".to_string(),
    }
}

/// I/O-bound producer: fans image downloads across a bounded task pool.
///
/// Any per-item fetch or persist error is caught, logged, and recorded in
/// the outcome; it never aborts sibling fetches or the call.
pub struct FetchStage<D: Downloader> {
    downloader: D,
    width: usize,
}

impl<D: Downloader> FetchStage<D> {
    pub fn new(downloader: D, width: usize) -> Self {
        Self { downloader, width }
    }

    pub async fn run(&self, store: &ArtifactStore, items: Vec<MediaItem>) -> BatchOutcome {
        let images: Vec<MediaItem> = items.into_iter().filter(|item| item.is_image()).collect();
        let mut outcome = BatchOutcome::new(images.len());
        if images.is_empty() {
            stage_info!("fetch stage: no image items to download");
            outcome.settle();
            return outcome;
        }

        stage_info!(
            "fetch stage: downloading {} images with pool width {}",
            images.len(),
            self.width
        );

        // Results arrive in completion order, not submission order.
        let results: Vec<(String, Result<(), FetchError>)> = stream::iter(images)
            .map(|item| async move {
                let key = item.date.clone();
                let result = self.fetch_one(store, &item).await;
                (key, result)
            })
            .buffer_unordered(self.width)
            .collect()
            .await;

        for (key, result) in results {
            match result {
                Ok(()) => outcome.record_success(),
                Err(err) => {
                    stage_warn!("fetch stage: skipping {key}: {err}");
                    outcome.record_failure(key, err.to_string());
                }
            }
        }

        outcome.settle();
        stage_info!(
            "fetch stage: {} downloaded, {} skipped",
            outcome.succeeded(),
            outcome.failures().len()
        );
        outcome
    }

    async fn fetch_one(&self, store: &ArtifactStore, item: &MediaItem) -> Result<(), FetchError> {
        let url = item
            .download_url()
            .ok_or_else(|| FetchError::new(FailureKind::InvalidUrl, "metadata entry has no url"))?;
        let ext = artifact_extension(url);
        let body = self.downloader.download(url).await?;
        store
            .put(&format!("{}{}", item.date, ext), &body)
            .map_err(|err| FetchError::new(FailureKind::Persist, err.to_string()))?;
        Ok(())
    }
}
