use std::fs;
use std::path::Path;

use collator_core::OrdinalRange;
use serde::Deserialize;
use stage_logging::stage_warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config from {path}: {message}")]
    Parse { path: String, message: String },
}

/// Run configuration, loaded from a RON file.
///
/// Every value has a default matching the stock pipeline, so a missing file
/// still yields a runnable setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: String,
    pub result_filename: String,
    pub ordinal_range: OrdinalRange,
    pub ordinal_count: usize,
    /// Fixed seed for reproducible enumeration; `None` draws from entropy.
    pub seed: Option<u64>,
    /// 0 sizes the compute pool to the logical CPU count.
    pub compute_workers: usize,
    pub fetch_width: usize,
    pub reader_width: usize,
    pub metadata_endpoint: String,
    pub api_key: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            result_filename: "result.csv".to_string(),
            ordinal_range: OrdinalRange::default(),
            ordinal_count: 1_000,
            seed: None,
            compute_workers: 0,
            fetch_width: collator_engine::DEFAULT_FETCH_WIDTH,
            reader_width: collator_engine::DEFAULT_READER_WIDTH,
            metadata_endpoint: "https://api.nasa.gov/planetary/apod".to_string(),
            api_key: "DEMO_KEY".to_string(),
            start_date: "2021-08-01".to_string(),
            end_date: "2021-09-30".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but does not parse is an error, not a fallback.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                stage_warn!("no config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: err,
                })
            }
        };

        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("collator.ron")).unwrap();
        assert_eq!(config.output_dir, "output");
        assert_eq!(config.ordinal_count, 1_000);
        assert_eq!(config.fetch_width, 10);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("collator.ron");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "(output_dir: \"artifacts\", seed: Some(42), ordinal_range: (low: 10, high: 99))"
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, "artifacts");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.ordinal_range.low, 10);
        assert_eq!(config.result_filename, "result.csv");
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("collator.ron");
        std::fs::write(&path, "{{{").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
