use crate::analysis::Analysis;
use crate::error::Result;
use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Where commitments would be written. Consumed only for display and for
/// building explorer links; nothing here is derived by the round itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_name")]
    pub name: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
}

fn default_chain_name() -> String {
    "sepolia".to_string()
}

fn default_chain_id() -> u64 {
    11_155_111
}

fn default_contract_address() -> String {
    "0x0000000000000000000000000000000000000000".to_string()
}

fn default_explorer_url() -> String {
    "https://sepolia.etherscan.io".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain_name(),
            chain_id: default_chain_id(),
            contract_address: default_contract_address(),
            explorer_url: default_explorer_url(),
        }
    }
}

impl ChainConfig {
    /// Block-explorer link for a submitted transaction.
    pub fn tx_url(&self, tx: &str) -> String {
        explorer_tx_url(&self.explorer_url, tx)
    }
}

pub fn explorer_tx_url(base: &str, tx: &str) -> String {
    format!("{}/tx/{}", base.trim_end_matches('/'), tx)
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    #[serde(default = "default_confidence")]
    pub default_confidence: u8,
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
    #[serde(default = "default_outcome")]
    pub default_outcome: Direction,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub analysis: Analysis,
}

fn default_demo_mode() -> bool {
    true
}

fn default_countdown_secs() -> u32 {
    30
}

fn default_confidence() -> u8 {
    65
}

fn default_reveal_delay_ms() -> u64 {
    800
}

fn default_confirm_delay_ms() -> u64 {
    2000
}

fn default_outcome() -> Direction {
    Direction::Up
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: default_demo_mode(),
            countdown_secs: default_countdown_secs(),
            default_confidence: default_confidence(),
            reveal_delay_ms: default_reveal_delay_ms(),
            confirm_delay_ms: default_confirm_delay_ms(),
            default_outcome: default_outcome(),
            chain: ChainConfig::default(),
            analysis: Analysis::default(),
        }
    }
}

impl Config {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    /// Load from `path`. A missing file means "all defaults".
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.countdown_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "countdown_secs is 0: every round expires immediately".to_string(),
            });
        }

        if self.default_confidence > 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "default_confidence={} is outside 0..=100",
                    self.default_confidence
                ),
            });
        }

        if self.analysis.confidence > 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "analysis.confidence={} is outside 0..=100",
                    self.analysis.confidence
                ),
            });
        }

        if crate::commitment::parse_address(&self.chain.contract_address).is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "chain.contract_address '{}' is not a 20-byte hex address",
                    self.chain.contract_address
                ),
            });
        }

        if self.chain.explorer_url.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "chain.explorer_url is empty: transaction links will be relative"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_round_defaults() {
        let cfg = Config::default();
        assert!(cfg.demo_mode);
        assert_eq!(cfg.countdown_secs, 30);
        assert_eq!(cfg.default_confidence, 65);
        assert_eq!(cfg.reveal_delay(), Duration::from_millis(800));
        assert_eq!(cfg.confirm_delay(), Duration::from_secs(2));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("demo_mode: false\ncountdown_secs: 10\n").unwrap();
        assert!(!cfg.demo_mode);
        assert_eq!(cfg.countdown_secs, 10);
        assert_eq!(cfg.default_confidence, 65);
        assert_eq!(cfg.chain.chain_id, 11_155_111);
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = Config::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn written_config_loads_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = crate::paths::config_path(dir.path());
        let mut cfg = Config::default();
        cfg.countdown_secs = 12;
        cfg.analysis.direction = Direction::Down;
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        crate::io::atomic_write(&path, yaml.as_bytes()).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_rejects_malformed_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "countdown_secs: [not, a, number]\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.countdown_secs = 0;
        cfg.default_confidence = 140;
        cfg.chain.contract_address = "0x1234".to_string();
        cfg.chain.explorer_url = "  ".to_string();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 4);
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            2
        );
    }

    #[test]
    fn explorer_url_trims_trailing_slash() {
        assert_eq!(
            explorer_tx_url("https://sepolia.etherscan.io/", "0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
        let chain = ChainConfig::default();
        assert_eq!(chain.tx_url("0x01"), "https://sepolia.etherscan.io/tx/0x01");
    }
}
