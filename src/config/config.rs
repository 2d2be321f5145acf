use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::filesystem::Size;

const CONFIG_FILE_NAME: &str = "dirlog.yaml";

const QUERIES_KEY: &str = "queries";
const SIZE_THRESHOLD_KEY: &str = "sizeThreshold";
const TOTAL_CAPACITY_KEY: &str = "totalCapacity";
const REQUIRED_FREE_KEY: &str = "requiredFree";

pub const DEFAULT_SIZE_THRESHOLD: Size = Size::new(100_000);
pub const DEFAULT_TOTAL_CAPACITY: Size = Size::new(70_000_000);
pub const DEFAULT_REQUIRED_FREE: Size = Size::new(30_000_000);

pub fn get_default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Parameters of the canonical size queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Directories at most this large count towards the size sum.
    pub size_threshold: Size,
    pub total_capacity: Size,
    /// Free space needed on the device after deleting a directory.
    pub required_free: Size,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            total_capacity: DEFAULT_TOTAL_CAPACITY,
            required_free: DEFAULT_REQUIRED_FREE,
        }
    }
}

impl QueryConfig {
    /// Reads `dirlog.yaml` from the working directory, falling back to the
    /// defaults when it does not exist.
    pub async fn read_default() -> Result<Self, ConfigCreationError> {
        let path = get_default_config_path();
        if !path.exists() {
            info!("No {} found, using default query parameters", path.display());
            return Ok(Self::default());
        }
        Self::from_path(&path).await
    }

    pub async fn from_path(path: &Path) -> Result<Self, ConfigCreationError> {
        debug!("Reading config file: {}", path.display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_queries(
        &mut self,
        queries: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ConfigCreationError> {
        for (key, value) in queries {
            let Yaml::Value(Scalar::String(key)) = key else {
                debug!("Skipping non-string query key: {:?}", key);
                continue;
            };
            let slot = match key.as_ref() {
                SIZE_THRESHOLD_KEY => &mut self.size_threshold,
                TOTAL_CAPACITY_KEY => &mut self.total_capacity,
                REQUIRED_FREE_KEY => &mut self.required_free,
                other => {
                    debug!("Skipping unknown query key: {other}");
                    continue;
                }
            };
            *slot = Self::parse_size(key, value)?;
        }
        Ok(())
    }

    fn parse_size(key: &str, value: &Yaml) -> Result<Size, ConfigCreationError> {
        match value {
            Yaml::Value(Scalar::Integer(n)) => u64::try_from(*n)
                .map(Size::new)
                .ok()
                .context(InvalidValueSnafu { key }),
            _ => InvalidValueSnafu { key }.fail(),
        }
    }
}

impl TryFrom<&str> for QueryConfig {
    type Error = ConfigCreationError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec
            .first()
            .context(MalformedConfigSnafu)?;

        let top_level = contents.as_mapping().context(TopLevelNotMapSnafu)?;

        let mut config = QueryConfig::default();
        let queries_key = Yaml::Value(Scalar::String(Cow::Borrowed(QUERIES_KEY)));
        if let Some(queries) = top_level.get(&queries_key) {
            let queries = queries.as_mapping().context(QueriesNotMapSnafu)?;
            config.apply_queries(queries)?;
        }

        debug!("Loaded query config: {:?}", config);
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigCreationError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Queries section should be a map"))]
    QueriesNotMap,
    #[snafu(display("Query parameter '{}' should be a non-negative integer", key))]
    InvalidValue { key: String },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::*;
    use tempfile::NamedTempFile;

    use super::*;

    #[compio::test]
    async fn config_returns_error_on_nonexistent_file() {
        let result = QueryConfig::from_path(Path::new("nonexistent.yaml")).await;
        assert!(matches!(
            result,
            Err(ConfigCreationError::ReadError { .. })
        ));
    }

    #[compio::test]
    async fn config_reads_values_from_file() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            temp_file,
            "queries:\n  sizeThreshold: 5\n  totalCapacity: 10\n  requiredFree: 2\n"
        )
        .expect("Failed to write to temp file");

        let config = QueryConfig::from_path(temp_file.path())
            .await
            .expect("Failed to read config");

        assert_eq!(
            config,
            QueryConfig {
                size_threshold: Size::new(5),
                total_capacity: Size::new(10),
                required_free: Size::new(2),
            }
        );
    }

    #[compio::test]
    async fn config_rejects_invalid_utf8() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(&[0xff, 0xfe, 0x00])
            .expect("Failed to write to temp file");

        let result = QueryConfig::from_path(temp_file.path()).await;
        assert!(matches!(
            result,
            Err(ConfigCreationError::EncodingError { .. })
        ));
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result: Result<QueryConfig, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(
            result,
            Err(ConfigCreationError::ParseError { .. })
        ));
    }

    #[test]
    fn config_returns_error_on_empty_file() {
        let result: Result<QueryConfig, _> = "".try_into();
        assert!(matches!(result, Err(ConfigCreationError::MalformedConfig)));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn config_returns_error_when_top_level_is_not_map(#[case] contents: &str) {
        let result: Result<QueryConfig, _> = contents.try_into();
        assert!(matches!(result, Err(ConfigCreationError::TopLevelNotMap)));
    }

    #[test]
    fn config_returns_error_when_queries_is_not_map() {
        let result: Result<QueryConfig, _> = "queries:\n  - 100".try_into();
        assert!(matches!(result, Err(ConfigCreationError::QueriesNotMap)));
    }

    #[test]
    fn config_handles_missing_queries_section() {
        let result: Result<QueryConfig, _> = "other_config: value".try_into();
        assert_eq!(result.unwrap(), QueryConfig::default());
    }

    #[test]
    fn config_keeps_defaults_for_unset_keys() {
        let result: Result<QueryConfig, _> = "queries:\n  sizeThreshold: 42".try_into();
        let config = result.unwrap();
        assert_eq!(config.size_threshold, Size::new(42));
        assert_eq!(config.total_capacity, DEFAULT_TOTAL_CAPACITY);
        assert_eq!(config.required_free, DEFAULT_REQUIRED_FREE);
    }

    #[test]
    fn config_skips_unknown_keys() {
        let yaml = "queries:\n  colour: blue\n  12: 3\n  requiredFree: 7";
        let result: Result<QueryConfig, _> = yaml.try_into();
        assert_eq!(result.unwrap().required_free, Size::new(7));
    }

    #[rstest]
    #[case("queries:\n  sizeThreshold: -1", SIZE_THRESHOLD_KEY)]
    #[case("queries:\n  totalCapacity: lots", TOTAL_CAPACITY_KEY)]
    #[case("queries:\n  requiredFree: 1.5", REQUIRED_FREE_KEY)]
    #[case("queries:\n  requiredFree: null", REQUIRED_FREE_KEY)]
    fn config_rejects_invalid_values(#[case] yaml: &str, #[case] expected_key: &str) {
        let result: Result<QueryConfig, _> = yaml.try_into();
        match result {
            Err(ConfigCreationError::InvalidValue { key }) => assert_eq!(key, expected_key),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }
}
