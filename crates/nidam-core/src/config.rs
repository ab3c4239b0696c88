//! Application configuration
//!
//! Defaults match the original N.I.D.A.M deployment (Pollinations services,
//! mistral model, fixed seed). An optional `nidam-config.json` in the data
//! directory overrides them; any read or parse error falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "nidam-config.json";

/// Chat completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatConfig {
    /// OpenAI-compatible chat completion endpoint
    pub endpoint: String,
    pub model: String,
    /// Deterministic seed forwarded with every request
    pub seed: u64,
    pub temperature: f64,
    /// Output-token budget assumed when a query is metered against credits
    pub expected_output_tokens: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://text.pollinations.ai/openai".to_string(),
            model: "mistral".to_string(),
            seed: 42,
            temperature: 0.7,
            expected_output_tokens: 256,
        }
    }
}

/// Image generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    pub endpoint: String,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub model: String,
    pub nologo: bool,
    pub enhance: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://image.pollinations.ai".to_string(),
            width: 512,
            height: 512,
            seed: 42,
            model: "turbo".to_string(),
            nologo: true,
            enhance: false,
        }
    }
}

/// Lightning wallet settings. Both fields must be present for a wallet to
/// be detected; otherwise payments degrade to "wallet not available".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    pub lnbits_url: Option<String>,
    pub lnbits_api_key: Option<String>,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub chat: ChatConfig,
    pub image: ImageConfig,
    pub wallet: WalletConfig,
}

impl AppConfig {
    /// Load configuration from `<data_dir>/nidam-config.json`.
    /// Returns defaults on any I/O or parse error (graceful degradation).
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Environment variables override the wallet settings so a wallet can be
    /// attached without editing the config file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("NIDAM_LNBITS_URL") {
            self.wallet.lnbits_url = Some(url);
        }
        if let Ok(key) = std::env::var("NIDAM_LNBITS_KEY") {
            self.wallet.lnbits_api_key = Some(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.chat.model, "mistral");
        assert_eq!(config.chat.seed, 42);
        assert_eq!(config.image.width, 512);
        assert!(config.image.nologo);
        assert!(config.wallet.lnbits_url.is_none());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(dir.path());
        assert_eq!(config.chat.model, "mistral");
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"chat": {"model": "llama"}}"#,
        )
        .unwrap();

        let config = AppConfig::load(dir.path());
        assert_eq!(config.chat.model, "llama");
        assert_eq!(config.chat.seed, 42);
        assert_eq!(config.image.model, "turbo");
    }

    #[test]
    fn test_load_malformed_file_is_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{broken").unwrap();
        let config = AppConfig::load(dir.path());
        assert_eq!(config.chat.model, "mistral");
    }
}
