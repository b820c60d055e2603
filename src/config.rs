use crate::client::ClientConfig;
use crate::non_zero_duration::NonZeroDuration;
use crate::source::SourceRegistry;

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "IPQUERY_CONFIG";
/// Used when `IPQUERY_CONFIG` is unset, built-in defaults apply if it does not exist.
pub const DEFAULT_CONFIG_PATH: &str = "ipquery.toml";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("command must be a single non-empty word, got {0:?}")]
    InvalidCommand(String),
    #[error("user_agent must not be empty")]
    EmptyUserAgent,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "Config::default_log_level")]
    pub log_level: log::Level,
    #[serde(default = "Config::default_command")]
    pub command: String,
    #[serde(default = "Config::default_timeout")]
    pub timeout: NonZeroDuration,
    #[serde(default = "Config::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "Config::default_tls_verify")]
    pub tls_verify: bool,
    #[serde(default)]
    pub use_env_proxy: bool,
    #[serde(default)]
    pub sources: SourceRegistry,
}

impl Config {
    fn default_log_level() -> log::Level {
        log::Level::Info
    }

    fn default_command() -> String {
        "ip".into()
    }

    fn default_timeout() -> NonZeroDuration {
        NonZeroDuration::from_secs(8).unwrap()
    }

    fn default_user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".into()
    }

    fn default_tls_verify() -> bool {
        true
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.timeout.into(),
            user_agent: self.user_agent.clone(),
            tls_verify: self.tls_verify,
            use_env_proxy: self.use_env_proxy,
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.command.is_empty() || self.command.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidCommand(self.command));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            command: Self::default_command(),
            timeout: Self::default_timeout(),
            user_agent: Self::default_user_agent(),
            tls_verify: Self::default_tls_verify(),
            use_env_proxy: false,
            sources: SourceRegistry::default(),
        }
    }
}

pub fn parse_config_str(toml_string: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(toml_string)?;
    Ok(config.validate()?)
}

pub fn parse_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let toml_string = std::fs::read_to_string(path)?;
    parse_config_str(&toml_string)
}

/// Reads the file named by `IPQUERY_CONFIG`, or `ipquery.toml` when it exists, or defaults.
pub fn load_config() -> anyhow::Result<Config> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => parse_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => parse_config(DEFAULT_CONFIG_PATH),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SchemaKind, Tier};
    use std::time::Duration;

    #[test]
    fn empty_file_is_default() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.log_level, log::Level::Info);
        assert_eq!(config.command, "ip");
        assert_eq!(config.timeout.as_duration(), Duration::from_secs(8));
        assert!(config.tls_verify);
        assert!(!config.use_env_proxy);
        assert_eq!(config.sources, SourceRegistry::default());
        assert_eq!(config.timeout, Config::default().timeout);
    }

    #[test]
    fn full_config() {
        let config = parse_config_str(
            r#"
            log_level = "debug"
            command = "geo"
            timeout = 10
            user_agent = "curl/8.0"
            tls_verify = false
            use_env_proxy = true

            [[sources]]
            name = "mirror"
            url = "https://mirror.example/json/{ip}"
            schema = "A"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, log::Level::Debug);
        assert_eq!(config.command, "geo");
        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.user_agent, "curl/8.0");
        assert!(!client.tls_verify);
        assert!(client.use_env_proxy);
        let source = config.sources.iter().next().unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(source.schema, SchemaKind::A);
        assert_eq!(source.tier, Tier::Primary);
    }

    #[test]
    fn invalid_values() {
        for toml_string in [
            "timeout = 0",
            "sources = []",
            r#"command = "ip query""#,
            r#"command = """#,
            r#"user_agent = " ""#,
            "unknown_key = 1",
        ] {
            assert!(parse_config_str(toml_string).is_err(), "{toml_string} must fail");
        }
    }
}
