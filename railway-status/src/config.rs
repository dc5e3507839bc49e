use serde::Deserialize;
use status_proxy::config::Config as StatusConfig;
use std::fs::File;
use std::path::Path;

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(flatten)]
    pub status: StatusConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Loads the config file if one was given, otherwise every section takes its defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://public@sentry.example.com/1
            listener:
                host: 0.0.0.0
                port: 8080
            upstream:
                url: http://localhost:4000/graphql
            api:
                strict_status: true
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125
            })
        );
        assert_eq!(
            config.common.logging.expect("logging config").sentry_dsn,
            "https://public@sentry.example.com/1"
        );
        assert_eq!(config.status.listener.port, 8080);
        assert_eq!(
            config.status.upstream.url.as_str(),
            "http://localhost:4000/graphql"
        );
        assert!(config.status.api.strict_status);
    }

    #[test]
    fn partial_config() {
        let tmp = write_tmp_file("listener:\n    host: 127.0.0.1\n    port: 9000\n");
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common, CommonConfig::default());
        assert_eq!(config.status.listener.host, "127.0.0.1");
        assert_eq!(config.status.listener.port, 9000);
        assert!(!config.status.api.strict_status);
    }

    #[test]
    fn no_config_file() {
        let config = Config::load(None).expect("default config");
        assert_eq!(config, Config::default());
        assert_eq!(config.status.listener.port, status_proxy::config::DEFAULT_PORT);
    }

    #[test]
    fn missing_config_file() {
        let result = Config::load(Some(Path::new("/nonexistent/railway-status.yaml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn invalid_config_file() {
        let tmp = write_tmp_file("listener:\n    port: not-a-port\n");
        let result = Config::from_file(tmp.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
