use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".hotelbook";
const CONFIG_FILE: &str = "hotelbook.conf";
const DB_FILE: &str = "hotelbook.sqlite";

/// Fields every config file is expected to carry; `config --check` reports
/// the ones missing.
pub const FIELDS: &[&str] = &[
    "database",
    "listen_addr",
    "owner_email",
    "mail_from",
    "session_lifetime_hours",
    "in_production",
    "log_level",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Recipient of the "new reservation" notification.
    #[serde(default = "default_owner_email")]
    pub owner_email: String,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_hours: i64,
    /// Marks the session cookie `Secure`.
    #[serde(default)]
    pub in_production: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_owner_email() -> String {
    "owner@hotelbook.local".to_string()
}
fn default_mail_from() -> String {
    "bookings@hotelbook.local".to_string()
}
fn default_session_lifetime() -> i64 {
    24
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            listen_addr: default_listen_addr(),
            owner_email: default_owner_email(),
            mail_from: default_mail_from(),
            session_lifetime_hours: default_session_lifetime(),
            in_production: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// `~/.hotelbook`, or `./.hotelbook` when no home directory is known.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DB_FILE)
    }

    /// Load the config file, or the defaults when there is none.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Names from [`FIELDS`] absent from the file at `path`.
    pub fn missing_fields(path: &Path) -> AppResult<Vec<&'static str>> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;

        let missing = FIELDS
            .iter()
            .copied()
            .filter(|f| yaml.get(*f).is_none())
            .collect();
        Ok(missing)
    }

    /// Create the config directory, the config file (unless `is_test`) and
    /// an empty database file. Returns the config that was written.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join(DB_FILE),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config)
    }
}
