// Environment configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::utils::init_map::DEFAULT_ORIGIN_NAME;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "store_router";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub nominatim_url: String,
    pub user_agent: String,
    pub geocode_timeout: Duration,
    pub origin_name: String,
    /// JSON registry file; the built-in stores are used when unset
    pub registry_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            origin_name: DEFAULT_ORIGIN_NAME.to_string(),
            registry_path: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("NOMINATIM_URL") {
            config.nominatim_url = url;
        }
        if let Some(agent) = lookup("GEOCODER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("GEOCODE_TIMEOUT_SECS") {
            config.geocode_timeout = parse_timeout("GEOCODE_TIMEOUT_SECS", &raw)?;
        }
        if let Some(name) = lookup("ORIGIN_NAME") {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "ORIGIN_NAME",
                    value: name,
                });
            }
            config.origin_name = name;
        }
        config.registry_path = lookup("STORE_REGISTRY").map(PathBuf::from);

        Ok(config)
    }

    /// Applies command line values on top of the environment
    ///
    /// The timeout is clamped to at least one second.
    pub fn with_overrides(mut self, registry: Option<PathBuf>, timeout_secs: Option<u64>) -> Self {
        if let Some(path) = registry {
            self.registry_path = Some(path);
        }
        if let Some(secs) = timeout_secs {
            self.geocode_timeout = Duration::from_secs(secs.max(1));
        }
        self
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.origin_name, "Buyer");
        assert_eq!(config.geocode_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("NOMINATIM_URL", "http://localhost:8080"),
            ("GEOCODE_TIMEOUT_SECS", "3"),
            ("ORIGIN_NAME", "Home"),
            ("STORE_REGISTRY", "stores.json"),
        ]))
        .unwrap();

        assert_eq!(config.nominatim_url, "http://localhost:8080");
        assert_eq!(config.geocode_timeout, Duration::from_secs(3));
        assert_eq!(config.origin_name, "Home");
        assert_eq!(config.registry_path, Some(PathBuf::from("stores.json")));
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let env = Config::from_lookup(lookup(&[
            ("GEOCODE_TIMEOUT_SECS", "3"),
            ("STORE_REGISTRY", "env.json"),
        ]))
        .unwrap();

        let config = env
            .clone()
            .with_overrides(Some(PathBuf::from("cli.json")), Some(7));
        assert_eq!(config.registry_path, Some(PathBuf::from("cli.json")));
        assert_eq!(config.geocode_timeout, Duration::from_secs(7));

        // Absent flags keep the environment values
        assert_eq!(env.clone().with_overrides(None, None), env);

        let config = env.with_overrides(None, Some(0));
        assert_eq!(config.geocode_timeout, Duration::from_secs(1));
        assert_eq!(config.registry_path, Some(PathBuf::from("env.json")));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["0", "-1", "soon"] {
            let err = Config::from_lookup(lookup(&[("GEOCODE_TIMEOUT_SECS", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "GEOCODE_TIMEOUT_SECS", .. }));
        }
    }

    #[test]
    fn test_blank_origin_name() {
        assert!(Config::from_lookup(lookup(&[("ORIGIN_NAME", "  ")])).is_err());
    }
}
