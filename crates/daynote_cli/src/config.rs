//! Runtime configuration for the daynote CLI.
//!
//! Priority: command-line flag, then environment, then per-user defaults.
//! Logging stays off when no absolute log directory can be derived.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DB_PATH_ENV_VAR: &str = "DAYNOTE_DB_PATH";
pub const LOG_DIR_ENV_VAR: &str = "DAYNOTE_LOG_DIR";
pub const LOG_LEVEL_ENV_VAR: &str = "DAYNOTE_LOG_LEVEL";

const APP_DIR_NAME: &str = "daynote";
const DB_FILE_NAME: &str = "daynote.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    /// Resolves configuration from the process environment.
    pub fn from_env(db_override: Option<PathBuf>) -> Result<Self> {
        Self::resolve(db_override, |key| std::env::var(key).ok(), dirs::data_dir())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn resolve(
        db_override: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let app_dir = data_dir.map(|dir| dir.join(APP_DIR_NAME));

        let db_path = match db_override.or_else(|| var(DB_PATH_ENV_VAR).map(PathBuf::from)) {
            Some(path) => path,
            None => app_dir
                .as_ref()
                .map(|dir| dir.join(DB_FILE_NAME))
                .ok_or_else(|| {
                    anyhow!("cannot determine a data directory; set {DB_PATH_ENV_VAR} or --db")
                })?,
        };

        let log_dir = var(LOG_DIR_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| app_dir.map(|dir| dir.join(LOG_DIR_NAME)))
            .or_else(|| {
                db_path
                    .parent()
                    .filter(|parent| parent.is_absolute())
                    .map(|parent| parent.join(LOG_DIR_NAME))
            });

        let log_level = var(LOG_LEVEL_ENV_VAR)
            .unwrap_or_else(|| daynote_core::default_log_level().to_string());

        Ok(Self {
            db_path,
            log_dir,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_live_under_data_dir() {
        let config =
            Config::resolve(None, lookup(&[]), Some(PathBuf::from("/data"))).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/daynote/daynote.sqlite3"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/data/daynote/logs")));
        assert_eq!(config.log_level, daynote_core::default_log_level());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::resolve(
            None,
            lookup(&[
                (DB_PATH_ENV_VAR, "/tmp/notes.db"),
                (LOG_DIR_ENV_VAR, "/tmp/logs"),
                (LOG_LEVEL_ENV_VAR, "warn"),
            ]),
            Some(PathBuf::from("/data")),
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/notes.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn flag_beats_environment() {
        let config = Config::resolve(
            Some(PathBuf::from("/flag.db")),
            lookup(&[(DB_PATH_ENV_VAR, "/env.db")]),
            None,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/flag.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/logs")));
    }

    #[test]
    fn relative_db_without_data_dir_disables_logging() {
        let config = Config::resolve(Some(PathBuf::from("notes.db")), lookup(&[]), None).unwrap();
        assert_eq!(config.db_path, PathBuf::from("notes.db"));
        assert_eq!(config.log_dir, None);

        let nested =
            Config::resolve(Some(PathBuf::from("data/notes.db")), lookup(&[]), None).unwrap();
        assert_eq!(nested.log_dir, None);
    }

    #[test]
    fn missing_data_dir_without_overrides_is_an_error() {
        let err = Config::resolve(None, lookup(&[(DB_PATH_ENV_VAR, "  ")]), None).unwrap_err();
        assert!(err.to_string().contains(DB_PATH_ENV_VAR));
    }
}
