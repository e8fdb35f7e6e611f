use chrono::NaiveDate;

use collator_core::MediaItem;
use stage_logging::{stage_debug, stage_warn};

use crate::settings::HttpSettings;
use crate::types::{map_reqwest_error, FailureKind, FetchError};

/// Date range for one metadata query, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Client for the media metadata endpoint.
///
/// A failed metadata call degrades to an empty item list: downstream stages
/// treat empty input as a valid no-op batch rather than an error.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    endpoint: String,
    api_key: String,
    settings: HttpSettings,
}

impl MetadataClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        settings: HttpSettings,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            settings,
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    /// Fetch metadata for a date range, degrading to an empty list on failure.
    pub async fn query(&self, query: &MetadataQuery) -> Vec<MediaItem> {
        match self.try_query(query).await {
            Ok(items) => {
                stage_debug!("metadata query returned {} items", items.len());
                items
            }
            Err(err) => {
                stage_warn!("metadata request failed, continuing with an empty batch: {err}");
                Vec::new()
            }
        }
    }

    async fn try_query(&self, query: &MetadataQuery) -> Result<Vec<MediaItem>, FetchError> {
        let client = self.build_client()?;
        let start = query.start_date.format("%Y-%m-%d").to_string();
        let end = query.end_date.format("%Y-%m-%d").to_string();

        let response = client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("start_date", start.as_str()),
                ("end_date", end.as_str()),
            ])
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

        response
            .json::<Vec<MediaItem>>()
            .await
            .map_err(|err| FetchError::new(FailureKind::MalformedBody, err.to_string()))
    }
}
