use crate::mining::difficulty::validate_difficulty;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::env;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub mining: MiningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading zero hex characters every block hash must carry.
    pub difficulty: u32,
    pub genesis_amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Abandon a proof-of-work search after this many seconds.
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig {
                difficulty: 2,
                genesis_amount: 100,
            },
            mining: MiningConfig::default(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, writing out the defaults if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_difficulty(self.ledger.difficulty)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home_dir).join(".minichain").join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChainError;
    use tempfile::TempDir;

    #[test]
    fn test_load_writes_defaults() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = Config::load(&path)?;

        assert_eq!(config, Config::default());
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_load_reads_saved_config() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut config = Config::default();
        config.ledger.difficulty = 3;
        config.mining.timeout_seconds = Some(30);
        config.save(&path)?;

        assert_eq!(Config::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_load_rejects_bad_difficulty() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"ledger":{"difficulty":70,"genesis_amount":1},"mining":{"timeout_seconds":null}}"#,
        )?;

        assert!(matches!(Config::load(&path), Err(ChainError::InvalidDifficulty(70))));
        Ok(())
    }

    #[test]
    fn test_load_rejects_malformed_json() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json")?;

        assert!(matches!(Config::load(&path), Err(ChainError::Serialization(_))));
        Ok(())
    }
}
