use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::{decode_fixed_hex, HexFieldError};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "dapp.toml";

/// Fixed rollup parameters the transport and address translator are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupConfig {
    pub rpc_url: String,
    pub rollup_type_hash: String,
    pub eth_account_lock_code_hash: String,
    pub web3_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptWait {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field} url '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("invalid {field}: {source}")]
    InvalidHash {
        field: &'static str,
        source: HexFieldError,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DappSettings {
    pub web3_provider_url: String,
    pub rollup_type_hash: String,
    pub eth_account_lock_code_hash: String,
    /// `None` means no wallet bridge is available in this environment.
    pub wallet_url: Option<String>,
    pub contract_artifact: PathBuf,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for DappSettings {
    fn default() -> Self {
        Self {
            web3_provider_url: "https://godwoken-testnet-web3-rpc.ckbapp.dev".into(),
            rollup_type_hash:
                "0x4cc2e6526204ae6a2e8fcf12f7ad472f41a1606d5b9624beebd215d780809f6a".into(),
            eth_account_lock_code_hash:
                "0xdeec13a7b8e100579541384ccaf4b5223733e4a5483c3aec95ddc4c1d5ea5b22".into(),
            wallet_url: Some("http://127.0.0.1:8545".into()),
            contract_artifact: PathBuf::from("build/contracts/SimpleStorage.json"),
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    web3_provider_url: Option<String>,
    rollup_type_hash: Option<String>,
    eth_account_lock_code_hash: Option<String>,
    wallet_url: Option<String>,
    contract_artifact: Option<PathBuf>,
    receipt_poll_interval_ms: Option<u64>,
    receipt_timeout_secs: Option<u64>,
}

impl DappSettings {
    pub fn rollup_config(&self) -> RollupConfig {
        RollupConfig {
            rpc_url: self.web3_provider_url.clone(),
            rollup_type_hash: self.rollup_type_hash.clone(),
            eth_account_lock_code_hash: self.eth_account_lock_code_hash.clone(),
            web3_url: self.web3_provider_url.clone(),
        }
    }

    pub fn receipt_wait(&self) -> ReceiptWait {
        ReceiptWait {
            poll_interval: Duration::from_millis(self.receipt_poll_interval_ms),
            timeout: Duration::from_secs(self.receipt_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_url("web3_provider_url", &self.web3_provider_url)?;
        if let Some(wallet_url) = &self.wallet_url {
            parse_url("wallet_url", wallet_url)?;
        }
        decode_fixed_hex::<32>(&self.rollup_type_hash).map_err(|source| {
            ConfigError::InvalidHash {
                field: "rollup_type_hash",
                source,
            }
        })?;
        decode_fixed_hex::<32>(&self.eth_account_lock_code_hash).map_err(|source| {
            ConfigError::InvalidHash {
                field: "eth_account_lock_code_hash",
                source,
            }
        })?;
        Ok(())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.web3_provider_url {
            self.web3_provider_url = v;
        }
        if let Some(v) = file_cfg.rollup_type_hash {
            self.rollup_type_hash = v;
        }
        if let Some(v) = file_cfg.eth_account_lock_code_hash {
            self.eth_account_lock_code_hash = v;
        }
        if let Some(v) = file_cfg.wallet_url {
            self.wallet_url = non_empty(v);
        }
        if let Some(v) = file_cfg.contract_artifact {
            self.contract_artifact = v;
        }
        if let Some(v) = file_cfg.receipt_poll_interval_ms {
            self.receipt_poll_interval_ms = v;
        }
        if let Some(v) = file_cfg.receipt_timeout_secs {
            self.receipt_timeout_secs = v;
        }
    }

    /// Applies `KEY` then `APP__KEY` overrides; the prefixed form wins.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let pick = |plain: &str, prefixed: &str| lookup(prefixed).or_else(|| lookup(plain));

        if let Some(v) = pick("WEB3_PROVIDER_URL", "APP__WEB3_PROVIDER_URL") {
            self.web3_provider_url = v;
        }
        if let Some(v) = pick("ROLLUP_TYPE_HASH", "APP__ROLLUP_TYPE_HASH") {
            self.rollup_type_hash = v;
        }
        if let Some(v) = pick("ETH_ACCOUNT_LOCK_CODE_HASH", "APP__ETH_ACCOUNT_LOCK_CODE_HASH") {
            self.eth_account_lock_code_hash = v;
        }
        if let Some(v) = pick("WALLET_URL", "APP__WALLET_URL") {
            self.wallet_url = non_empty(v);
        }
        if let Some(v) = pick("CONTRACT_ARTIFACT", "APP__CONTRACT_ARTIFACT") {
            self.contract_artifact = PathBuf::from(v);
        }
        if let Some(v) = lookup("APP__RECEIPT_POLL_INTERVAL_MS") {
            self.receipt_poll_interval_ms =
                v.parse().map_err(|_| ConfigError::InvalidEnv {
                    key: "APP__RECEIPT_POLL_INTERVAL_MS",
                    value: v.clone(),
                })?;
        }
        if let Some(v) = lookup("APP__RECEIPT_TIMEOUT_SECS") {
            self.receipt_timeout_secs = v.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "APP__RECEIPT_TIMEOUT_SECS",
                value: v.clone(),
            })?;
        }
        Ok(())
    }
}

/// Defaults, then the settings file, then the process environment.
///
/// An explicitly named file must exist; the default `dapp.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<DappSettings, ConfigError> {
    let mut settings = DappSettings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<FileSettings>(&raw).map_err(|source| {
                ConfigError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
            settings.apply_file(file_cfg);
            tracing::debug!(path = %path.display(), "loaded settings file");
        }
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(ConfigError::Read { path, source }),
    }

    settings.apply_env_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

/// Command-line flags; applied after the file and environment layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub web3_provider_url: Option<String>,
    pub wallet_url: Option<String>,
    pub contract_artifact: Option<PathBuf>,
    pub no_wallet: bool,
}

impl SettingsOverrides {
    pub fn apply(self, settings: &mut DappSettings) -> Result<(), ConfigError> {
        if let Some(v) = self.web3_provider_url {
            settings.web3_provider_url = v;
        }
        if let Some(v) = self.wallet_url {
            settings.wallet_url = non_empty(v);
        }
        if self.no_wallet {
            settings.wallet_url = None;
        }
        if let Some(v) = self.contract_artifact {
            settings.contract_artifact = v;
        }
        settings.validate()
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
