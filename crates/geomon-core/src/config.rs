use crate::error::{GeomonError, Result};
use crate::models::{ConjunctionMode, Crs, ValidityMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Query-string keys that carry a CQL filter unless configured otherwise
pub const DEFAULT_FILTER_KEYS: [&str; 2] = ["CQL_FILTER", "FILTER"];

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for Geomon
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// EPSG code assumed for filter geometries that carry no SRID
    pub crs: ConfigValue<u32>,
    pub conjunction: ConfigValue<ConjunctionMode>,
    pub geometry_validity: ConfigValue<ValidityMode>,
    pub filter_keys: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            crs: ConfigValue::new(4326, ConfigSource::Default),
            conjunction: ConfigValue::new(ConjunctionMode::Intersect, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
            filter_keys: ConfigValue::new(
                DEFAULT_FILTER_KEYS.iter().map(|k| k.to_string()).collect(),
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeomonError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.crs {
            self.crs.update(crs, ConfigSource::File);
        }

        if let Some(conjunction) = file_config.conjunction {
            self.conjunction.update(conjunction, ConfigSource::File);
        }

        if let Some(geometry_validity) = file_config.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::File);
        }

        if let Some(filter_keys) = file_config.filter_keys {
            if filter_keys.is_empty() {
                return Err(GeomonError::ConfigInvalid {
                    key: "filter_keys".to_string(),
                    reason: "At least one filter key is required".to_string(),
                });
            }
            self.filter_keys.update(filter_keys, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOMON_CRS
        if let Ok(crs_str) = env::var("GEOMON_CRS") {
            match Crs::parse(&crs_str) {
                Ok(crs) => self.crs.update(crs.epsg, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMON_CRS value '{}': expected an EPSG code",
                    crs_str
                ),
            }
        }

        // GEOMON_CONJUNCTION
        if let Ok(mode_str) = env::var("GEOMON_CONJUNCTION") {
            match parse_conjunction_mode(&mode_str) {
                Ok(mode) => self.conjunction.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMON_CONJUNCTION value '{}': expected intersect or per-attribute",
                    mode_str
                ),
            }
        }

        // GEOMON_GEOMETRY_VALIDITY
        if let Ok(validity_str) = env::var("GEOMON_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMON_GEOMETRY_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        // GEOMON_FILTER_KEYS
        if let Ok(keys_str) = env::var("GEOMON_FILTER_KEYS") {
            match parse_filter_keys(&keys_str) {
                Ok(keys) => self.filter_keys.update(keys, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMON_FILTER_KEYS value '{}': expected comma separated keys",
                    keys_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.crs {
            self.crs.update(crs, ConfigSource::Cli);
        }

        if let Some(conjunction) = overrides.conjunction {
            self.conjunction.update(conjunction, ConfigSource::Cli);
        }

        if let Some(geometry_validity) = overrides.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::Cli);
        }

        if let Some(filter_keys) = overrides.filter_keys {
            self.filter_keys.update(filter_keys, ConfigSource::Cli);
        }
    }

    /// The CRS assumed for filter geometries without an SRID
    pub fn default_crs(&self) -> Crs {
        Crs::from_epsg(self.crs.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("crs".to_string(), (format!("EPSG:{}", self.crs.value), self.crs.source));

        map.insert(
            "conjunction".to_string(),
            (format!("{:?}", self.conjunction.value), self.conjunction.source),
        );

        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map.insert(
            "filter_keys".to_string(),
            (self.filter_keys.value.join(","), self.filter_keys.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    crs: Option<u32>,
    conjunction: Option<ConjunctionMode>,
    geometry_validity: Option<ValidityMode>,
    filter_keys: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub crs: Option<u32>,
    pub conjunction: Option<ConjunctionMode>,
    pub geometry_validity: Option<ValidityMode>,
    pub filter_keys: Option<Vec<String>>,
}

/// Parse conjunction mode from string
pub fn parse_conjunction_mode(s: &str) -> Result<ConjunctionMode> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "intersect" => Ok(ConjunctionMode::Intersect),
        "per-attribute" | "attribute" => Ok(ConjunctionMode::PerAttribute),
        _ => Err(GeomonError::ConfigInvalid {
            key: "conjunction".to_string(),
            reason: format!("Invalid conjunction mode: {}. Use intersect or per-attribute", s),
        }),
    }
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(GeomonError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}

/// Parse a comma separated list of filter keys
pub fn parse_filter_keys(s: &str) -> Result<Vec<String>> {
    let keys: Vec<String> = s
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(GeomonError::ConfigInvalid {
            key: "filter_keys".to_string(),
            reason: "At least one filter key is required".to_string(),
        });
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.crs.value, 4326);
        assert_eq!(config.crs.source, ConfigSource::Default);
        assert_eq!(config.conjunction.value, ConjunctionMode::Intersect);
        assert_eq!(config.filter_keys.value, vec!["CQL_FILTER", "FILTER"]);
        assert_eq!(config.default_crs(), Crs::wgs84());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
crs = 3857
conjunction = "PerAttribute"
geometry_validity = "Strict"
filter_keys = ["CQL_FILTER"]
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.crs.value, 3857);
        assert_eq!(config.crs.source, ConfigSource::File);
        assert_eq!(config.conjunction.value, ConjunctionMode::PerAttribute);
        assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
        assert_eq!(config.filter_keys.value, vec!["CQL_FILTER"]);
    }

    #[test]
    fn test_empty_filter_keys_in_file_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "filter_keys = []").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(GeomonError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            crs: Some(32748),
            conjunction: Some(ConjunctionMode::PerAttribute),
            geometry_validity: None,
            filter_keys: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(config.crs.value, 32748);
        assert_eq!(config.crs.source, ConfigSource::Cli);
        assert_eq!(config.conjunction.value, ConjunctionMode::PerAttribute);
        assert_eq!(config.geometry_validity.source, ConfigSource::Default);
        assert_eq!(config.filter_keys.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_conjunction_mode() {
        assert_eq!(parse_conjunction_mode("intersect").unwrap(), ConjunctionMode::Intersect);
        assert_eq!(
            parse_conjunction_mode("PER_ATTRIBUTE").unwrap(),
            ConjunctionMode::PerAttribute
        );
        assert_eq!(parse_conjunction_mode("per-attribute").unwrap(), ConjunctionMode::PerAttribute);
        assert!(parse_conjunction_mode("union").is_err());
    }

    #[test]
    fn test_parse_validity_mode() {
        assert_eq!(parse_validity_mode("strict").unwrap(), ValidityMode::Strict);
        assert_eq!(parse_validity_mode("LENIENT").unwrap(), ValidityMode::Lenient);
        assert!(parse_validity_mode("invalid").is_err());
    }

    #[test]
    fn test_parse_filter_keys() {
        assert_eq!(parse_filter_keys("cql_filter, filter").unwrap(), vec!["cql_filter", "filter"]);
        assert!(parse_filter_keys(" , ").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("crs"));
        assert!(map.contains_key("conjunction"));
        assert!(map.contains_key("geometry_validity"));
        assert!(map.contains_key("filter_keys"));

        let (crs_value, crs_source) = &map["crs"];
        assert_eq!(crs_value, "EPSG:4326");
        assert_eq!(*crs_source, ConfigSource::Default);
        assert_eq!(map["filter_keys"].0, "CQL_FILTER,FILTER");
    }
}
