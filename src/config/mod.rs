// Configuration module entry point
// Loads layered configuration: file, environment, then built-in defaults

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{Config, LoggingConfig, PerformanceConfig, ServeConfig, ServerConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `SERVER__*` environment variables override it,
    /// e.g. `SERVER__SERVE__ROOT=/srv/www`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from TOML text, on top of the defaults
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults(config::Config::builder())?
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("serve.root", ".")?
            .set_default("serve.index_file", "index.html")?
            .set_default("serve.max_age_secs", 0)?
            .set_default("serve.immutable", false)?
            .set_default("serve.compress", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "default")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.serve.root, ".");
        assert_eq!(cfg.serve.index_file(), Some("index.html"));
        assert!(cfg.serve.compress);
        assert_eq!(cfg.logging.access_log_format, "default");
        assert_eq!(cfg.logging.access_log_file, None);
        assert_eq!(cfg.performance.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            workers = 2

            [serve]
            root = "/srv/www"
            index_file = ""
            max_age_secs = 600
            immutable = true

            [logging]
            access_log_format = "json"
            access_log_file = "logs/access.log"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.serve.index_file(), None);
        assert_eq!(cfg.logging.access_log_file.as_deref(), Some("logs/access.log"));

        let opts = cfg.serve.response_options();
        assert_eq!(opts.max_age, Some(Duration::from_secs(600)));
        assert_eq!(opts.immutable, Some(true));
        assert_eq!(opts.compress, Some(true));
    }

    #[test]
    fn test_invalid_address() {
        let cfg = Config::from_toml("[server]\nhost = \"not an ip\"").unwrap();
        assert!(cfg.socket_addr().is_err());
    }
}
