use serde::Deserialize;
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_URL: &str = "https://backboard.railway.app/graphql/v2";

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

/// The upstream GraphQL endpoint all traversals are sent to.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Upstream {
    pub url: Url,
}

impl Default for Upstream {
    fn default() -> Self {
        Upstream {
            url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Api {
    // When set, a lookup of a deployment whose status is not SUCCESS answers
    // 503 instead of 200. The response body is the same either way.
    #[serde(default)]
    pub strict_status: bool,
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub api: Api,
}

impl Config {
    /// Applies a `PORT` style override. Values that are not a valid port
    /// number are ignored and the configured port is kept.
    pub fn with_port_override(mut self, port: Option<&str>) -> Self {
        if let Some(raw) = port {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.listener.port = port,
                Err(_) => tracing::warn!(
                    value = raw,
                    port = self.listener.port,
                    "Ignoring non-numeric port override"
                ),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listener.port, 3000);
        assert_eq!(
            config.upstream.url.as_str(),
            "https://backboard.railway.app/graphql/v2"
        );
        assert!(!config.api.strict_status);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
listener:
    host: "127.0.0.1"
    port: 8080
upstream:
    url: "http://localhost:4000/graphql"
api:
    strict_status: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.upstream.url.as_str(), "http://localhost:4000/graphql");
        assert!(config.api.strict_status);
    }

    #[test]
    fn test_invalid_upstream_url() {
        let yaml = r#"
upstream:
    url: "not a url"
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_port_override() {
        let config = Config::default().with_port_override(Some("8081"));
        assert_eq!(config.listener.port, 8081);

        let config = Config::default().with_port_override(None);
        assert_eq!(config.listener.port, DEFAULT_PORT);

        let config = Config::default().with_port_override(Some("eighty"));
        assert_eq!(config.listener.port, DEFAULT_PORT);

        let config = Config::default().with_port_override(Some("70000"));
        assert_eq!(config.listener.port, DEFAULT_PORT);
    }
}
