/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use sqlwai::app_config::{Config, GenerationProvider, LogLevel};
use crate::common;

/// Test default configuration creation
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.generation.provider, GenerationProvider::Ollama);
    assert_eq!(config.generation.get_model(), "llama3.1");
    assert_eq!(config.generation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.generation.common.max_attempts, 3);
    assert_eq!(config.generation.common.retry_delay_ms, 1000);
    assert_eq!(config.server.port, 1346);
    assert_eq!(config.server.rpc_path, "/RPC2");
    assert_eq!(config.server.bind_address(), "0.0.0.0:1346");
    assert_eq!(config.schema_file, "schema.json");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.server.port, config.server.port);
    assert_eq!(reloaded.generation.available_providers.len(), 4);
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "generation": {
                "provider": "openai",
                "available_providers": [
                    {"type": "openai", "model": "gpt-4o", "api_key": "sk-test"}
                ],
                "common": {"max_attempts": 5}
            },
            "server": {"port": 8080},
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.generation.provider, GenerationProvider::OpenAI);
    assert_eq!(config.generation.get_model(), "gpt-4o");
    assert_eq!(config.generation.get_api_key(), "sk-test");
    // Empty endpoint falls back to the provider default
    assert_eq!(config.generation.get_endpoint(), "https://api.openai.com/v1");
    assert_eq!(config.generation.common.max_attempts, 5);
    assert_eq!(config.generation.common.retry_delay_ms, 1000);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;
    let error = Config::load_or_create(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_validate_withHostedProviderAndNoKey_shouldFail() {
    let mut config = Config::default();
    config.generation.provider = GenerationProvider::Anthropic;
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("API key"));

    config.generation.active_provider_config_mut().api_key = "key".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withLocalProviders_shouldNotNeedKey() {
    let mut config = Config::default();
    config.generation.provider = GenerationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBadServerSettings_shouldFail() {
    let mut config = Config::default();
    config.server.port = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.rpc_path = "RPC2".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.generation.common.temperature = 3.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.generation.available_providers.clear();
    config.generation.provider = GenerationProvider::LMStudio;

    config.generation.active_provider_config_mut().model = "qwen2.5-coder".to_string();

    assert_eq!(config.generation.available_providers.len(), 1);
    assert_eq!(config.generation.get_model(), "qwen2.5-coder");
    assert_eq!(config.generation.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_generationProvider_fromStr_shouldAcceptKnownNames() {
    assert_eq!("OpenAI".parse::<GenerationProvider>().unwrap(), GenerationProvider::OpenAI);
    assert_eq!("lmstudio".parse::<GenerationProvider>().unwrap(), GenerationProvider::LMStudio);
    assert!("gemini".parse::<GenerationProvider>().is_err());
    assert_eq!(GenerationProvider::Anthropic.to_string(), "anthropic");
}
