//! Collator engine: artifact store, producer stages, and aggregation.
mod aggregate;
mod compute;
mod fetch;
mod metadata;
mod settings;
mod store;
mod types;

pub use aggregate::{AggregateError, AggregateSummary, Aggregator};
pub use compute::{fib, ComputeError, ComputeStage};
pub use fetch::{Downloader, FetchStage, ReqwestDownloader};
pub use metadata::{MetadataClient, MetadataQuery};
pub use settings::{HttpSettings, DEFAULT_FETCH_WIDTH, DEFAULT_READER_WIDTH};
pub use store::{ArtifactStore, StoreError};
pub use types::{FailureKind, FetchError};
