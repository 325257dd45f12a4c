//! Application configuration.
//!
//! Settings are persisted as JSON under the platform config directory and
//! can be overridden per-field through `CERTLEDGER_*` environment variables.
//! The pinning bearer token is deployment-time secret material: it is held
//! as a [`SecretString`], never written back to disk in the clear, and is
//! expected to arrive via the environment.

use crate::error::{Result, ResultExt as _};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder written to disk in place of the real bearer token.
pub const SECRET_PLACEHOLDER: &str = "__ENV__";

/// Default client-side upload ceiling (10 MB). A UX guard, not a protocol
/// limit; the pinning provider enforces its own quota.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Ledger JSON-RPC endpoint (Ganache-style node with unlocked accounts)
    pub rpc_url: String,
    /// Address of the deployed certificate contract
    pub contract_address: String,
    /// Pinning provider API base URL
    pub pinning_api_base: String,
    /// Pinning provider bearer token (JWT)
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub pinning_jwt: SecretString,
    /// Public gateway base used to resolve a CID to bytes
    pub gateway_base: String,
    /// Origin embedded in shareable verification links
    pub site_origin: String,
    /// Bind address for the HTTP API server
    pub bind_addr: String,
    /// Maximum accepted certificate file size in bytes
    pub max_upload_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:7545".to_owned(),
            contract_address: String::new(),
            pinning_api_base: "https://api.pinata.cloud".to_owned(),
            pinning_jwt: SecretString::new(String::new().into()),
            gateway_base: "https://gateway.pinata.cloud".to_owned(),
            site_origin: "http://localhost:3000".to_owned(),
            bind_addr: "0.0.0.0:3000".to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Apply `CERTLEDGER_*` environment overrides on top of the loaded
    /// settings. Unset variables leave the loaded value untouched.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CERTLEDGER_RPC_URL") {
            self.rpc_url = v;
        }
        if let Ok(v) = std::env::var("CERTLEDGER_CONTRACT_ADDRESS") {
            self.contract_address = v;
        }
        if let Ok(v) = std::env::var("CERTLEDGER_PINNING_API_BASE") {
            self.pinning_api_base = v;
        }
        if let Ok(v) = std::env::var("CERTLEDGER_PINATA_JWT") {
            self.pinning_jwt = SecretString::new(v.into());
        }
        if let Ok(v) = std::env::var("CERTLEDGER_GATEWAY_BASE") {
            self.gateway_base = v;
        }
        if let Ok(v) = std::env::var("CERTLEDGER_SITE_ORIGIN") {
            self.site_origin = v;
        }
        if let Ok(v) = std::env::var("CERTLEDGER_BIND_ADDR") {
            self.bind_addr = v;
        }
    }
}

fn serialize_secret<S>(secret: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let value = secret.expose_secret();
    if value.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str(SECRET_PLACEHOLDER)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into()))
}

pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("certledger")
        .join("config.json")
}

/// Load the application config: defaults, then the config file if present,
/// then environment overrides.
pub fn load_app_config() -> AppConfig {
    let path = get_config_path();
    let mut config = AppConfig::default();

    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
        && let Ok(loaded) = serde_json::from_str::<AppConfig>(&content)
    {
        config = loaded;
    }

    config.apply_env_overrides();
    config
}

pub fn save_app_config(config: &AppConfig) -> Result<()> {
    let path = get_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_never_serialized_in_clear() {
        let config = AppConfig {
            pinning_jwt: SecretString::new("real-jwt-token".to_owned().into()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("real-jwt-token"));
        assert!(json.contains(SECRET_PLACEHOLDER));
    }

    #[test]
    fn test_empty_secret_serialized_empty() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET_PLACEHOLDER));
    }

    #[test]
    fn test_roundtrip_keeps_non_secret_fields() {
        let config = AppConfig {
            contract_address: "0x91aa8EB4D4C3ff7646692dd92A232F997df66595".to_owned(),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let loaded: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.contract_address, config.contract_address);
        assert_eq!(loaded.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
