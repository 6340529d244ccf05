//! Configuration resolution for cleancheck-api
//!
//! Vision credential priority: ENV → TOML. Port priority: CLI/ENV → TOML →
//! built-in default.

use cleancheck_common::config::{TomlConfig, VisionConfig};
use tracing::{info, warn};

/// Environment variable holding the vision provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolve the vision provider API key
///
/// Returns `None` when no source carries a usable key; the server still
/// starts, but every analysis fails until a key is configured.
pub fn resolve_vision_api_key(vision: &VisionConfig) -> Option<String> {
    let mut sources = Vec::new();

    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    if env_key.is_some() {
        sources.push("environment");
    }

    let toml_key = vision.api_key.clone().filter(|k| is_valid_key(k));
    if toml_key.is_some() {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Vision API key found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = env_key {
        info!("Vision API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Vision API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "Vision API key not configured. Set {} or [vision] api_key in the config file; \
         analysis requests will fail until then",
        API_KEY_ENV
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Listening port: command line (or `PORT`) wins over the TOML file
pub fn resolve_port(cli_port: Option<u16>, toml_config: &TomlConfig) -> u16 {
    cli_port.unwrap_or(toml_config.port)
}
