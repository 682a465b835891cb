//! Layered configuration for the `taskdeck` binary.
//!
//! Priority (highest first): CLI arguments, environment variables (via clap `env`),
//! the TOML file (`<config_dir>/taskdeck/config.toml`), compiled defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Duration;
use taskdeck_core::{AppConfig, Environment};

const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("a session secret is required (--session-secret or TASKDECK_SESSION_SECRET)")]
    MissingSecret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    storage: StorageFileConfig,
    session: SessionFileConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    bind_addr: Option<String>,
    environment: Option<String>,
    frontend_url: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    backend: Option<String>,
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    secret: Option<String>,
    ttl_days: Option<i64>,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Default)]
pub struct CliArgs {
    /// Path to config file (default: `<config_dir>/taskdeck/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Address the HTTP server binds to.
    #[arg(short, long, global = true, env = "TASKDECK_ADDR")]
    pub bind: Option<String>,

    /// Directory holding tasks.json and users.json.
    #[arg(long, global = true, env = "TASKDECK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend (file, memory).
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// development or production; controls the session cookie flags.
    #[arg(long, global = true, env = "TASKDECK_ENV")]
    pub environment: Option<String>,

    #[arg(long, global = true, env = "TASKDECK_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    #[arg(long, global = true)]
    pub session_ttl_days: Option<i64>,

    /// Origin allowed to call the API with credentials.
    #[arg(long, global = true, env = "TASKDECK_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "TASKDECK_LOG")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: Option<PathBuf>,
    pub storage: StorageBackend,
    pub environment: Environment,
    pub session_secret: Option<String>,
    pub session_ttl_days: i64,
    pub frontend_url: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            data_dir: None,
            storage: StorageBackend::File,
            environment: Environment::Development,
            session_secret: None,
            session_ttl_days: 7,
            frontend_url: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// An explicit `--config` that cannot be read is an error; a missing default file is not.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage: StorageBackend = match cli.storage.as_ref().or(file.storage.backend.as_ref()) {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::Invalid { key: "storage", message })?,
            None => defaults.storage,
        };
        let environment: Environment = match cli.environment.as_ref().or(file.server.environment.as_ref()) {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::Invalid { key: "environment", message })?,
            None => defaults.environment,
        };
        let session_ttl_days = cli
            .session_ttl_days
            .or(file.session.ttl_days)
            .unwrap_or(defaults.session_ttl_days);
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&session_ttl_days) {
            return Err(ConfigError::Invalid {
                key: "session_ttl_days",
                message: format!("must be between 1 and {}", MAX_SESSION_TTL_DAYS),
            });
        }

        Ok(Self {
            bind_addr: cli
                .bind
                .clone()
                .or_else(|| file.server.bind_addr.clone())
                .unwrap_or(defaults.bind_addr),
            data_dir: cli.data_dir.clone().or_else(|| file.storage.data_dir.clone()),
            storage,
            environment,
            session_secret: cli
                .session_secret
                .clone()
                .or_else(|| file.session.secret.clone())
                .filter(|s| !s.is_empty()),
            session_ttl_days,
            frontend_url: cli.frontend_url.clone().or_else(|| file.server.frontend_url.clone()),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.server.log_level.clone())
                .unwrap_or(defaults.log_level),
        })
    }

    /// Only `serve` needs a secret, so it is checked here rather than in `load`.
    pub fn app_config(&self) -> Result<AppConfig, ConfigError> {
        let secret = self.session_secret.clone().ok_or(ConfigError::MissingSecret)?;
        let ttl = Duration::try_days(self.session_ttl_days).ok_or_else(|| ConfigError::Invalid {
            key: "session_ttl_days",
            message: format!("{} days is out of range", self.session_ttl_days),
        })?;
        Ok(AppConfig::new(self.environment, secret, ttl))
    }
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskdeck").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::config::SameSite;

    fn parse(toml_str: &str) -> ConfigFile {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(&CliArgs::default(), &ConfigFile::default()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.session_ttl_days, 7);
        assert_eq!(config.log_level, "info");
        assert!(config.session_secret.is_none());
    }

    #[test]
    fn test_file_values_apply() {
        let file = parse(
            r#"
[server]
bind_addr = "127.0.0.1:8080"
environment = "production"
frontend_url = "https://app.example.com"

[storage]
backend = "memory"

[session]
secret = "from-file"
ttl_days = 2
"#,
        );
        let config = Config::resolve(&CliArgs::default(), &file).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.frontend_url.as_deref(), Some("https://app.example.com"));

        let app = config.app_config().unwrap();
        assert_eq!(app.session.secret, "from-file");
        assert_eq!(app.session.ttl, Duration::days(2));
        assert!(app.cookie.secure);
        assert_eq!(app.cookie.same_site, SameSite::None);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse(
            r#"
[server]
bind_addr = "127.0.0.1:8080"
log_level = "warn"

[session]
secret = "from-file"
"#,
        );
        let cli = CliArgs {
            bind: Some("0.0.0.0:3000".to_string()),
            session_secret: Some("from-cli".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(&cli, &file).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.session_secret.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = CliArgs {
            storage: Some("postgres".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Config::resolve(&cli, &ConfigFile::default()),
            Err(ConfigError::Invalid { key: "storage", .. })
        ));

        let file = parse("[session]\nttl_days = 0\n");
        assert!(matches!(
            Config::resolve(&CliArgs::default(), &file),
            Err(ConfigError::Invalid { key: "session_ttl_days", .. })
        ));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let file = parse(&format!("[session]\nsecret = \"s\"\nttl_days = {}\n", i64::MAX / 2));
        assert!(matches!(
            Config::resolve(&CliArgs::default(), &file),
            Err(ConfigError::Invalid { key: "session_ttl_days", .. })
        ));

        let cli = CliArgs {
            session_ttl_days: Some(MAX_SESSION_TTL_DAYS + 1),
            ..Default::default()
        };
        assert!(Config::resolve(&cli, &ConfigFile::default()).is_err());

        let cli = CliArgs {
            session_secret: Some("s".to_string()),
            session_ttl_days: Some(MAX_SESSION_TTL_DAYS),
            ..Default::default()
        };
        let app = Config::resolve(&cli, &ConfigFile::default()).unwrap().app_config().unwrap();
        assert_eq!(app.session.ttl, Duration::days(MAX_SESSION_TTL_DAYS));

        let config = Config {
            session_secret: Some("s".to_string()),
            session_ttl_days: i64::MAX,
            ..Config::default()
        };
        assert!(matches!(
            config.app_config(),
            Err(ConfigError::Invalid { key: "session_ttl_days", .. })
        ));
    }

    #[test]
    fn test_serve_requires_secret() {
        let cli = CliArgs {
            session_secret: Some(String::new()),
            ..Default::default()
        };
        let config = Config::resolve(&cli, &ConfigFile::default()).unwrap();
        assert!(matches!(config.app_config(), Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/srv/taskdeck\"\n").unwrap();

        let config = Config::load(&CliArgs {
            config: Some(path),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/taskdeck")));

        let missing = load_config_file(Some(&dir.path().join("nope.toml")));
        assert!(matches!(missing, Err(ConfigError::ReadFile { .. })));
    }
}
