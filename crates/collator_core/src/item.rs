use serde::Deserialize;

/// One unit of CPU-bound work: compute the `ordinal`-th Fibonacci number.
///
/// Work items are created at enumeration time and never persisted; the
/// durable result lives in the artifact store under `key()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeItem {
    pub ordinal: u64,
}

impl ComputeItem {
    pub fn new(ordinal: u64) -> Self {
        Self { ordinal }
    }

    /// Artifact key for this item: the decimal ordinal.
    pub fn key(&self) -> String {
        self.ordinal.to_string()
    }
}

/// One metadata entry describing a remote media resource, as returned by
/// the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaItem {
    pub date: String,
    pub media_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub hdurl: Option<String>,
}

impl MediaItem {
    /// Only image entries are downloadable; videos and interactive pages
    /// are filtered out before the fetch stage fans out.
    pub fn is_image(&self) -> bool {
        self.media_type == "image"
    }

    /// Resolve the download URL, preferring the high-resolution variant.
    pub fn download_url(&self) -> Option<&str> {
        self.hdurl.as_deref().or(self.url.as_deref())
    }
}
