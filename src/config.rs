use crate::core::db::BackendKind;
use crate::core::{Result, ShopError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "MECHANIC_SHOP_CONFIG";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Connection details not given on the command line.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: BackendKind,
    pub host: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            backend: BackendKind::Postgres,
            host: "localhost".to_string(),
            password: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The configured maximum log level.
    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.level)
            .map_err(|_| ShopError::Config(format!("unknown log level '{}'", self.level)))
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = mechanic_shop::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| ShopError::Config(format!("{}: {}", path.display(), e)))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| ShopError::Config(format!("{}: {}", path.display(), e)))?;
    config.logging.level()?;
    Ok(config)
}

/// Location of the configuration file: `$MECHANIC_SHOP_CONFIG`, else
/// `<config dir>/mechanic-shop/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => dirs::config_dir().map(|dir| dir.join("mechanic-shop").join("config.toml")),
    }
}

/// Loads the configuration file if there is one, defaults otherwise.
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config(path),
        _ => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CONFIG: &str = r#"
[database]
backend = "sqlite"
host = "db.shop.internal"
password = "hunter2"

[logging]
level = "debug"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.database.backend, BackendKind::Sqlite);
        assert_eq!(config.database.host, "db.shop.internal");
        assert_eq!(config.database.password, "hunter2");
        assert_eq!(config.logging.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[logging]\nlevel = \"info\"\n").unwrap();
        assert_eq!(config.database.backend, BackendKind::Postgres);
        assert_eq!(config.database.host, "localhost");
        assert!(config.database.password.is_empty());
    }

    #[test]
    fn test_load_config_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"loud\"").unwrap();
        match load_config(file.path()) {
            Err(ShopError::Config(msg)) => assert!(msg.contains("loud")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nbackend = \"oracle\"").unwrap();
        assert!(matches!(load_config(file.path()), Err(ShopError::Config(_))));
    }
}
