mod overrides;

pub use overrides::apply_env_overrides;

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Complete monitor configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the competition server lives
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Server-sent event stream of tick messages
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    /// POST endpoint that halts the competition
    #[serde(default = "default_stop_path")]
    pub stop_path: String,
    /// Upper bound on a stop request (milliseconds)
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_stream_path() -> String {
    "/stream-competition".to_string()
}

fn default_stop_path() -> String {
    "/stop-competition".to_string()
}

fn default_stop_timeout_ms() -> u64 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            stop_path: default_stop_path(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.stream_path)
    }

    pub fn stop_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.stop_path)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// Delay inserted before each message is applied
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

impl PacingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Front-end settings
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Terminal redraw interval (milliseconds)
    #[serde(default = "default_redraw_ms")]
    pub redraw_ms: u64,
    /// Run without the terminal dashboard and log progress instead
    #[serde(default)]
    pub headless: bool,
    /// Log destination while the terminal dashboard owns the screen
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_redraw_ms() -> u64 {
    100
}

fn default_log_file() -> String {
    "farm-arena.log".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            redraw_ms: default_redraw_ms(),
            headless: false,
            log_file: default_log_file(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Read(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(reason) => write!(f, "cannot read config: {}", reason),
            ConfigError::Parse(reason) => write!(f, "cannot parse config: {}", reason),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MonitorConfig {
    /// Checks values that serde can't
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.server.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "server.base_url must start with http:// or https://, got '{}'",
                url
            )));
        }
        for (name, path) in [
            ("server.stream_path", &self.server.stream_path),
            ("server.stop_path", &self.server.stop_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }
        if self.server.stop_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "server.stop_timeout_ms must be positive".to_string(),
            ));
        }
        if self.ui.redraw_ms == 0 {
            return Err(ConfigError::Invalid("ui.redraw_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.server.stream_url(), "http://localhost:8000/stream-competition");
        assert_eq!(config.server.stop_url(), "http://localhost:8000/stop-competition");
        assert_eq!(config.server.stop_timeout(), Duration::from_secs(5));
        assert_eq!(config.pacing.delay(), Duration::from_secs(1));
        assert_eq!(config.ui.redraw_ms, 100);
        assert!(!config.ui.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            base_url = "https://arena.example.com/"
            stream_path = "/events"
            stop_path = "/halt"

            [pacing]
            delay_ms = 250

            [ui]
            redraw_ms = 50
            headless = true
            log_file = "/tmp/arena.log"
        "#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.server.stream_url(), "https://arena.example.com/events");
        assert_eq!(config.server.stop_url(), "https://arena.example.com/halt");
        assert_eq!(config.pacing.delay_ms, 250);
        assert_eq!(config.ui.redraw_ms, 50);
        assert!(config.ui.headless);
        assert_eq!(config.ui.log_file, "/tmp/arena.log");
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [pacing]
            delay_ms = 0
        "#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.pacing.delay(), Duration::ZERO);
        assert_eq!(config.server.stream_path, "/stream-competition");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_url = r#"
            [server]
            base_url = "localhost:8000"
        "#;
        assert!(matches!(parse_config(bad_url), Err(ConfigError::Invalid(_))));

        let bad_path = r#"
            [server]
            stop_path = "stop"
        "#;
        assert!(matches!(parse_config(bad_path), Err(ConfigError::Invalid(_))));

        let no_stop_timeout = r#"
            [server]
            stop_timeout_ms = 0
        "#;
        assert!(matches!(parse_config(no_stop_timeout), Err(ConfigError::Invalid(_))));

        assert!(matches!(parse_config("[pacing"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pacing]\ndelay_ms = 10").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pacing.delay_ms, 10);

        let missing = load_config("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Read(_))));
    }
}
