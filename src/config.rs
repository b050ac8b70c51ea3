//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ServerError;

/// Server configuration loaded from environment variables.
///
/// Precedence, lowest first: field defaults, `.env` file, process
/// environment, then whatever the CLI overrides with [`Config::apply_overrides`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Listener ===
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Development ===
    /// Restart the server when watched files change.
    #[serde(default)]
    pub reload: bool,

    /// Extra paths watched by the reload supervisor, comma separated in the
    /// environment. The running executable is always watched.
    #[serde(default)]
    pub reload_dirs: Vec<PathBuf>,

    // === Observability ===
    /// Port for the Prometheus exporter. Disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log filter (trace, debug, info, warn, error or a full directive).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub reload: bool,
    pub verbose: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            reload: false,
            reload_dirs: Vec::new(),
            metrics_port: None,
            rust_log: default_log_level(),
            log_json: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ServerError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Layer CLI values on top of the loaded configuration.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        // Flags can only switch these on.
        self.reload |= overrides.reload;
        self.verbose |= overrides.verbose;
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.trim().is_empty() {
            return Err(ServerError::InvalidConfig("HOST must not be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ServerError::InvalidConfig("PORT must be non-zero".to_string()));
        }

        if self.metrics_port == Some(self.port) {
            return Err(ServerError::InvalidConfig(
                "METRICS_PORT must differ from PORT".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` string handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:metrics_port`, when the exporter is enabled.
    pub fn metrics_address(&self) -> Option<String> {
        self.metrics_port.map(|port| format!("{}:{}", self.host, port))
    }

    /// Log filter directive after accounting for `verbose`.
    pub fn log_filter(&self) -> String {
        if self.verbose {
            "dodream_ai=debug,tower_http=debug,info".to_string()
        } else {
            self.rust_log.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_dev_server() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(!config.reload);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(config.metrics_address().is_none());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_host() {
        let config = Config {
            host: "  ".to_string(),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = Config {
            port: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_metrics_port_collision() {
        let config = Config {
            metrics_port: Some(8000),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            reload: true,
            verbose: false,
        });

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert!(config.reload);
        assert!(!config.verbose);
    }

    #[test]
    fn absent_overrides_keep_loaded_values() {
        let mut config = Config {
            port: 8123,
            reload: true,
            ..Config::default()
        };
        config.apply_overrides(Overrides::default());

        assert_eq!(config.port, 8123);
        assert!(config.reload);
    }

    #[test]
    fn verbose_switches_log_filter() {
        let config = Config {
            verbose: true,
            ..Config::default()
        };
        assert!(config.log_filter().starts_with("dodream_ai=debug"));
        assert_eq!(Config::default().log_filter(), "info");
    }

    #[test]
    fn deserializes_from_env_pairs() {
        let vars = vec![
            ("HOST".to_string(), "127.0.0.1".to_string()),
            ("PORT".to_string(), "8081".to_string()),
            ("RELOAD".to_string(), "true".to_string()),
            ("RELOAD_DIRS".to_string(), "src,templates".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 8081);
        assert!(config.reload);
        assert_eq!(
            config.reload_dirs,
            vec![PathBuf::from("src"), PathBuf::from("templates")]
        );
        assert_eq!(config.rust_log, "info");
    }
}
