// Configuration module entry point
// Loads layered configuration and owns the shared application state

mod state;
mod types;

use std::net::SocketAddr;

use crate::registry::{default_activities, ActivityRegistry};

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogLevel, RoutesConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in order of precedence: `SIGNUP_*` environment variables
    /// (`__` separates nesting, e.g. `SIGNUP_SERVER__PORT`), the config file,
    /// then built-in defaults. A missing file is not an error.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SIGNUP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "activity-signup/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("routes.static_dir", "static")?
            .set_default("routes.static_prefix", "/static")?
            .set_default("routes.index_page", "/static/index.html")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Build the startup registry from `[registry]`, falling back to the built-in catalog
    pub fn build_registry(&self) -> ActivityRegistry {
        let registry = if self.registry.activities.is_empty() {
            ActivityRegistry::new(default_activities())
        } else {
            ActivityRegistry::new(self.registry.activities.iter().cloned().map(Into::into))
        };
        registry.with_capacity_enforcement(self.registry.enforce_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.routes.index_page, "/static/index.html");
        assert_eq!(cfg.routes.static_prefix, "/static");
        assert!(cfg.routes.health.enabled);
        assert!(!cfg.registry.enforce_capacity);
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8000".parse().unwrap()
        );
    }

    #[test]
    fn test_default_registry_is_builtin_seed() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        let registry = cfg.build_registry();
        assert_eq!(registry, ActivityRegistry::default());
    }

    #[test]
    fn test_seed_from_file_keeps_name_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signup.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[server]
port = 9100

[registry]
enforce_capacity = true

[[registry.activities]]
name = "Robotics Lab"
description = "Build robots"
schedule = "Saturdays"
max_participants = 1
participants = ["r@x.com"]
"#
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);

        let mut registry = cfg.build_registry();
        assert_eq!(registry.len(), 1);
        assert!(registry.enforces_capacity());
        assert_eq!(
            registry.list_activities()["Robotics Lab"].participants,
            vec!["r@x.com"]
        );
        assert!(registry.signup("Robotics Lab", "s@x.com").is_err());
    }

    #[test]
    fn test_log_level_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let quiet = dir.path().join("quiet.toml");
        std::fs::write(&quiet, "[logging]\nlevel = \"warn\"\n").unwrap();
        let cfg = Config::load_from(quiet.with_extension("").to_str().unwrap()).unwrap();
        assert_eq!(cfg.logging.level, LogLevel::Warn);

        let bogus = dir.path().join("bogus.toml");
        std::fs::write(&bogus, "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(Config::load_from(bogus.with_extension("").to_str().unwrap()).is_err());
    }

    #[test]
    fn test_log_level_threshold() {
        assert!(LogLevel::Info.allows(LogLevel::Warn));
        assert!(LogLevel::Info.allows(LogLevel::Info));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
        assert!(LogLevel::Error.allows(LogLevel::Error));
        assert!(!LogLevel::Error.allows(LogLevel::Warn));
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_seed_activity_parses_from_toml() {
        let seed: types::SeedActivity = toml::from_str(
            r#"
name = "Chess Club"
description = "Chess"
schedule = "Fridays"
max_participants = 12
"#,
        )
        .unwrap();
        let (name, activity) = seed.into();
        assert_eq!(name, "Chess Club");
        assert!(activity.participants.is_empty());
    }
}
