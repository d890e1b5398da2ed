//! Server configuration
//!
//! Each setting is read from the environment and falls back to a fixed
//! default:
//! 1. OPENING_TRAINER_DB, else ./opening_trainer.db
//! 2. OPENING_TRAINER_ADDR, else 127.0.0.1:3000

use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "OPENING_TRAINER_DB";
pub const BIND_ADDR_VAR: &str = "OPENING_TRAINER_ADDR";

const DEFAULT_DB_PATH: &str = "./opening_trainer.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            db_path: var(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            bind_addr: var(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./opening_trainer.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = ServerConfig::from_lookup(|name| match name {
            DB_PATH_VAR => Some("/tmp/trainer.db".to_string()),
            BIND_ADDR_VAR => Some("0.0.0.0:8080".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/tmp/trainer.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = ServerConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, ServerConfig::default());
    }
}
