use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", cfg.to_yaml()?);
        Ok(())
    }

    /// Report fields missing from the config file. Missing fields fall back
    /// to their defaults, so this only warns.
    pub fn check(path: &Path) -> AppResult<()> {
        if !path.exists() {
            warning(format!(
                "No configuration file at {}; defaults are in use.",
                path.display()
            ));
            return Ok(());
        }

        let missing = Config::missing_fields(path)?;
        if missing.is_empty() {
            success("Configuration file is complete.");
        } else {
            for field in missing {
                warning(format!("Missing field '{}' (default used)", field));
            }
        }
        Ok(())
    }

    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        let ed = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| {
                if cfg!(target_os = "windows") {
                    "notepad".into()
                } else {
                    "nano".into()
                }
            });

        let status = Command::new(&ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("cannot start '{}': {}", ed, e)))?;

        if !status.success() {
            return Err(AppError::Config(format!("editor '{}' exited with {}", ed, status)));
        }
        success(format!("Configuration file edited with '{}'", ed));
        Ok(())
    }
}
