//! Tests for the configuration module.
//!
//! This module contains tests for configuration loading, validation, and usage.

use crate::config::{
    registry::RegistryConfig, render::RenderConfig, rest::RestConfig, security::SecurityConfig,
    ConfigLoader, LanaiConfig, Validate,
};
use crate::error::config::ConfigError;
use crate::tests::TestFixture;
use std::net::SocketAddr;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = LanaiConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.rest.prefix, "/router/rest");
    assert_eq!(config.security.token_header, "X-Access-Token");
    assert!(config.security.access_tokens.is_empty());
}

/// Test that configuration validation catches invalid values.
#[test]
fn test_config_validation() {
    let mut config = LanaiConfig::default();

    config.server.worker_threads = 0;
    assert!(config.validate().is_err());

    config.server.worker_threads = 4;
    config.rest.prefix = "router/rest".to_string();
    assert!(config.validate().is_err());

    config.rest.prefix = "/router/rest".to_string();
    config.log.level = "verbose".to_string();
    assert!(config.validate().is_err());

    config.log.level = "debug".to_string();
    assert!(config.validate().is_ok());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .write_file(
            "gateway.toml",
            r#"
            [server]
            name = "test-gateway"
            worker_threads = 2
            address = "0.0.0.0:8080"

            [rest]
            prefix = "/api/rest"

            [security]
            access_tokens = ["alpha", "beta"]
            "#,
        )
        .unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "LANAI_TEST_FILE");
    let config = loader.load().unwrap();

    assert_eq!(config.server.name, "test-gateway");
    assert_eq!(config.server.worker_threads, 2);
    assert_eq!(config.server.address, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    assert_eq!(config.rest.prefix, "/api/rest");
    assert_eq!(config.security.access_tokens, vec!["alpha", "beta"]);

    // Other values should be defaults
    assert_eq!(config.rest.shorthand_version, "1.0");
    assert_eq!(config.registry.method_table, "restful.json");
}

/// Test loading configuration with environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .write_file("gateway.toml", "[server]\nname = \"file-gateway\"\n")
        .unwrap();

    fixture.set_env("LANAI_TEST_ENV__SERVER__NAME", "env-gateway");
    fixture.set_env("LANAI_TEST_ENV__LOG__LEVEL", "debug");

    let loader = ConfigLoader::new(Some(&config_path), "LANAI_TEST_ENV");
    let config = loader.load().unwrap();

    assert_eq!(config.server.name, "env-gateway");
    assert_eq!(config.log.level, "debug");
}

/// Test that loading an invalid configuration file returns an error.
#[test]
fn test_load_invalid_config() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .write_file("invalid.toml", "[server\nname = test-server\"\n")
        .unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "LANAI_TEST_INVALID");
    assert!(matches!(loader.load(), Err(ConfigError::ParseError(_))));
}

/// Test that a missing file and an unknown extension are reported.
#[test]
fn test_load_missing_or_unsupported_file() {
    let fixture = TestFixture::new().unwrap();

    let missing = fixture.temp_dir.path().join("absent.toml");
    let loader = ConfigLoader::new(Some(&missing), "LANAI_TEST_MISSING");
    assert!(matches!(loader.load(), Err(ConfigError::FileNotFound(_))));

    let ini = fixture.write_file("gateway.ini", "name = x").unwrap();
    let loader = ConfigLoader::new(Some(&ini), "LANAI_TEST_INI");
    assert!(matches!(loader.load(), Err(ConfigError::ParseError(_))));
}

/// Test that a loaded configuration is still validated.
#[test]
fn test_loaded_config_is_validated() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .write_file("gateway.json", r#"{"security": {"token_header": "bad header"}}"#)
        .unwrap();

    let loader = ConfigLoader::new(Some(&config_path), "LANAI_TEST_VALIDATE");
    assert!(matches!(loader.load(), Err(ConfigError::ValidationError(_))));
}

/// Test that validation fails for various invalid configurations.
#[test]
fn test_specific_validation_rules() {
    let rest = RestConfig {
        prefix: "/router/rest/".to_string(),
        ..RestConfig::default()
    };
    assert!(rest.validate().is_err());

    let rest = RestConfig {
        shorthand_format: String::new(),
        ..RestConfig::default()
    };
    assert!(rest.validate().is_err());

    let security = SecurityConfig {
        access_tokens: vec!["ok".to_string(), String::new()],
        ..SecurityConfig::default()
    };
    assert!(security.validate().is_err());

    let registry = RegistryConfig {
        method_table: " ".to_string(),
        ..RegistryConfig::default()
    };
    assert!(registry.validate().is_err());

    let render = RenderConfig {
        timeout_ms: 0,
        ..RenderConfig::default()
    };
    assert!(render.validate().is_err());
}

/// Test that the generated default configuration loads back unchanged.
#[test]
fn test_generated_config_round_trips() {
    let fixture = TestFixture::new().unwrap();
    let toml = toml::to_string_pretty(&LanaiConfig::default()).unwrap();
    let config_path = fixture.write_file("generated.toml", toml).unwrap();

    let config = ConfigLoader::new(Some(&config_path), "LANAI_TEST_GENERATED")
        .load()
        .unwrap();
    assert_eq!(config.server.max_body_size, 500 * 1024);
    assert_eq!(config.render.program, None);
    assert_eq!(config.registry.component_root, std::path::PathBuf::from("components"));
}

/// Test that loading without a file yields the defaults, empty lists included.
#[test]
fn test_load_defaults_without_file() {
    let config = ConfigLoader::new(None::<&std::path::Path>, "LANAI_TEST_NONE")
        .load()
        .unwrap();

    assert!(config.security.access_tokens.is_empty());
    assert!(config.render.args.is_empty());
    assert_eq!(config.security.token_header, "X-Access-Token");
    assert_eq!(config.render.timeout_ms, 60_000);
}

/// Test that a file setting only some keys of a section keeps the other defaults.
#[test]
fn test_partial_sections_keep_defaults() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .write_file(
            "partial.toml",
            "[render]\nprogram = \"/usr/bin/renderer\"\n\n[security]\ntoken_header = \"X-Token\"\n",
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&config_path), "LANAI_TEST_PARTIAL")
        .load()
        .unwrap();

    assert_eq!(
        config.render.program,
        Some(std::path::PathBuf::from("/usr/bin/renderer"))
    );
    assert!(config.render.args.is_empty());
    assert_eq!(config.security.token_header, "X-Token");
    assert!(config.security.access_tokens.is_empty());
}
