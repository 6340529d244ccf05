//! Configuration resolution tests
//!
//! Tests that manipulate OPENAI_API_KEY are marked with #[serial] so they
//! never run in parallel with each other.

use cleancheck_api::config::{is_valid_key, resolve_port, resolve_vision_api_key, API_KEY_ENV};
use cleancheck_common::config::{TomlConfig, VisionConfig};
use serial_test::serial;

fn vision_with_key(key: Option<&str>) -> VisionConfig {
    VisionConfig {
        api_key: key.map(str::to_string),
        ..VisionConfig::default()
    }
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    std::env::set_var(API_KEY_ENV, "env-key");
    let key = resolve_vision_api_key(&vision_with_key(Some("toml-key")));
    std::env::remove_var(API_KEY_ENV);

    assert_eq!(key.as_deref(), Some("env-key"));
}

#[test]
#[serial]
fn test_toml_fallback_when_env_missing() {
    std::env::remove_var(API_KEY_ENV);
    let key = resolve_vision_api_key(&vision_with_key(Some("toml-key")));

    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    std::env::set_var(API_KEY_ENV, "   ");
    let key = resolve_vision_api_key(&vision_with_key(Some("toml-key")));
    std::env::remove_var(API_KEY_ENV);

    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_no_key_anywhere() {
    std::env::remove_var(API_KEY_ENV);
    assert!(resolve_vision_api_key(&vision_with_key(None)).is_none());
    assert!(resolve_vision_api_key(&vision_with_key(Some(""))).is_none());
}

#[test]
fn test_is_valid_key() {
    assert!(is_valid_key("sk-abc"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key(" \t\n"));
}

#[test]
fn test_port_priority() {
    let toml_config = TomlConfig {
        port: 8080,
        ..TomlConfig::default()
    };
    assert_eq!(resolve_port(Some(9000), &toml_config), 9000);
    assert_eq!(resolve_port(None, &toml_config), 8080);
    assert_eq!(resolve_port(None, &TomlConfig::default()), 3000);
}
