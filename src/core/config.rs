//! Configuration management for the waypoint graph
//!
//! Settings are read from a TOML file, then overridden by `WG_*` environment
//! variables, then validated. Every section has defaults so a partial file
//! (or no file at all) is valid.

use crate::core::error::{CodecError, Error, Result};
use crate::render::Rgb;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Config file looked up in the working directory by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "waypoint-graph.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path search limits
    pub search: SearchConfig,

    /// Graph persistence
    pub storage: StorageConfig,

    /// Drawing styles handed to the renderer
    pub render: RenderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Path search limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of nodes a single search may expand (0 = unbounded)
    pub max_expansions: usize,

    /// Wall-clock deadline for a single search (absent = unbounded)
    #[serde(
        deserialize_with = "deserialize_opt_duration",
        serialize_with = "serialize_opt_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<Duration>,
}

/// On-disk graph encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Magic-tagged bincode document
    #[default]
    Binary,
    /// Pretty-printed JSON document
    Json,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Graph file used by the command-line shell
    pub graph_path: PathBuf,

    /// Encoding used when saving
    pub format: GraphFormat,

    /// Largest graph document accepted on load (bytes)
    pub max_graph_bytes: u64,
}

/// Drawing styles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge line color
    pub edge_color: Rgb,

    /// Edge line width
    pub edge_width: f64,

    /// Node marker color
    pub node_color: Rgb,

    /// Node marker radius
    pub marker_radius: f64,

    /// Node label color
    pub label_color: Rgb,

    /// Label anchor offset from the node position
    pub label_offset: (f64, f64),

    /// Highlighted route color
    pub route_color: Rgb,

    /// Highlighted route width
    pub route_width: f64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from("./graph.wpg"),
            format: GraphFormat::Binary,
            max_graph_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            edge_color: Rgb::new(0, 0, 255),
            edge_width: 2.0,
            node_color: Rgb::new(255, 0, 0),
            marker_radius: 5.0,
            label_color: Rgb::new(0, 0, 255),
            label_offset: (5.0, -5.0),
            route_color: Rgb::new(0, 255, 0),
            route_width: 3.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file (if present) and
    /// environment variables
    pub fn load() -> Result<Self> {
        let mut config = if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        // Storage overrides
        if let Some(path) = var("WG_GRAPH_PATH") {
            self.storage.graph_path = PathBuf::from(path);
        }

        if let Some(format) = var("WG_FORMAT") {
            self.storage.format = parse_format(&format)?;
        }

        // Search overrides
        if let Some(max) = var("WG_MAX_EXPANSIONS") {
            self.search.max_expansions = max
                .parse()
                .map_err(|e| Error::config(format!("Invalid max expansions: {}", e)))?;
        }

        if let Some(deadline) = var("WG_SEARCH_DEADLINE") {
            let deadline = parse_duration(&deadline)
                .map_err(|e| Error::config(format!("Invalid search deadline: {}", e)))?;
            self.search.deadline = Some(deadline);
        }

        // Logging overrides
        if let Some(level) = var("WG_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = var("WG_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.max_graph_bytes < 64 {
            return Err(Error::config("Max graph size too small (minimum 64 bytes)"));
        }

        if self.search.deadline == Some(Duration::ZERO) {
            return Err(Error::config("Search deadline must be greater than zero"));
        }

        for (name, width) in [
            ("edge width", self.render.edge_width),
            ("route width", self.render.route_width),
            ("marker radius", self.render.marker_radius),
        ] {
            if !width.is_finite() || width <= 0.0 {
                return Err(Error::config(format!("Invalid {}: {}", name, width)));
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&str>) -> Config {
    match path {
        Some(path) => match Config::from_file(path).and_then(|config| {
            config.validate()?;
            Ok(config)
        }) {
            Ok(config) => {
                info!("Loaded configuration from: {}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}. Using defaults.", path, e);
                Config::default()
            }
        },
        None => {
            info!("No config file specified, using defaults");
            Config::default()
        }
    }
}

impl std::str::FromStr for GraphFormat {
    type Err = CodecError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(GraphFormat::Binary),
            "json" => Ok(GraphFormat::Json),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn parse_format(value: &str) -> Result<GraphFormat> {
    value.parse().map_err(|e: CodecError| {
        Error::config(format!("{}. Valid options: binary, json", e))
    })
}

// Optional duration from strings like "250ms" or "5s"
fn deserialize_opt_duration<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration string like '250ms' or '5s'")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(value).map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(value)))
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(value)
                .map(|secs| Some(Duration::from_secs(secs)))
                .map_err(|_| E::custom("duration must not be negative"))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

fn serialize_opt_duration<S>(value: &Option<Duration>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&format!("{}ms", duration.as_millis())),
        None => serializer.serialize_none(),
    }
}

// Simple duration parser for common formats
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let ms: u64 = ms.parse().map_err(|_| "Invalid milliseconds")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(secs) = s.strip_suffix('s') {
        let secs: u64 = secs.parse().map_err(|_| "Invalid seconds")?;
        Ok(Duration::from_secs(secs))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.parse().map_err(|_| "Invalid minutes")?;
        Ok(Duration::from_secs(mins * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        let hours: u64 = hours.parse().map_err(|_| "Invalid hours")?;
        Ok(Duration::from_secs(hours * 3600))
    } else {
        // Try parsing as raw seconds
        let secs: u64 = s.parse().map_err(|_| "Invalid duration format")?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_expansions, 0);
        assert_eq!(config.storage.format, GraphFormat::Binary);
        assert_eq!(config.render.marker_radius, 5.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [search]
            max_expansions = 500
            deadline = "250ms"

            [storage]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.max_expansions, 500);
        assert_eq!(config.search.deadline, Some(Duration::from_millis(250)));
        assert_eq!(config.storage.format, GraphFormat::Json);
        assert_eq!(config.storage.graph_path, PathBuf::from("./graph.wpg"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.search.deadline = Some(Duration::from_secs(2));
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("WG_GRAPH_PATH", "/tmp/campus.wpg"),
            ("WG_FORMAT", "json"),
            ("WG_MAX_EXPANSIONS", "42"),
            ("WG_SEARCH_DEADLINE", "2m"),
            ("WG_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.graph_path, PathBuf::from("/tmp/campus.wpg"));
        assert_eq!(config.storage.format, GraphFormat::Json);
        assert_eq!(config.search.max_expansions, 42);
        assert_eq!(config.search.deadline, Some(Duration::from_secs(120)));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn invalid_env_override_is_a_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "WG_FORMAT").then(|| "xml".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.route_width = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.deadline = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn duration_formats() {
        assert_eq!(parse_duration("15ms"), Ok(Duration::from_millis(15)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_or_default(Some("/definitely/not/here.toml"));
        assert_eq!(config, Config::default());
    }
}
