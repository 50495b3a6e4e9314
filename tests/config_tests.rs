//! Integration tests for TOML configuration loading and provider resolution

use agentry::agents::catalog;
use agentry::llm::{ConfigBasedLLMFactory, EnvLookup, Provider, ProviderRegistry};
use agentry::types::AppError;
use agentry::utils::toml_config::{AgentryConfig, ConfigError};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

fn env_from(pairs: &[(&str, &str)]) -> EnvLookup {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(move |name: &str| vars.get(name).cloned())
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
default_model = "fast"

[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"

[models.fast]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.2

[research]
min_searches = 3
max_searches = 8
max_concurrent_searches = 4

[logging]
json = true
"#
    )
    .unwrap();

    let config = AgentryConfig::load(file.path()).unwrap();
    assert_eq!(config.default_model, "fast");
    assert_eq!(config.research.min_searches, 3);
    assert_eq!(config.research.max_concurrent_searches, Some(4));
    assert!(config.research.enforce_plan_size);
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.execution.max_tool_iterations, 10);
}

#[test]
fn test_missing_file_falls_back_to_builtin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("agentry.toml");

    assert!(matches!(
        AgentryConfig::load(&path),
        Err(ConfigError::FileNotFound(_))
    ));

    let config = AgentryConfig::load_or_default(&path).unwrap();
    assert_eq!(config.default_model, "default");
    assert!(config.get_provider("azure").is_some());
    assert_eq!(
        config.get_model("coding").and_then(|m| m.model_env.as_deref()),
        Some("AZURE_MODEL_NAME_O4_MINI")
    );
}

#[test]
fn test_dangling_provider_is_rejected() {
    let err = AgentryConfig::from_toml_str(
        r#"
[models.default]
provider = "nowhere"
model = "gpt-4o"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingProvider(p, m) if p == "nowhere" && m == "default"));
}

#[test]
fn test_bad_research_bounds_are_rejected() {
    let err = AgentryConfig::from_toml_str(
        r#"
[research]
min_searches = 10
max_searches = 5
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(AppError::from(err).to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_env_vars_are_listed() {
    let config = AgentryConfig::default();
    let missing = config.missing_env_vars_with(|name| {
        (name == "AZURE_API_KEY").then(|| "key".to_string())
    });

    assert!(!missing.contains(&"AZURE_API_KEY".to_string()));
    assert!(missing.contains(&"AZURE_BASE_URL".to_string()));
    assert!(missing.contains(&"AZURE_MODEL_NAME".to_string()));
    assert!(missing.contains(&"OPENWEATHER_API_KEY".to_string()));

    let mut sorted = missing.clone();
    sorted.sort();
    assert_eq!(missing, sorted);
}

#[test]
fn test_builtin_azure_resolution() {
    let config = AgentryConfig::default();
    let registry = ProviderRegistry::with_env(
        &config,
        env_from(&[
            ("AZURE_BASE_URL", "https://example.openai.azure.com"),
            ("AZURE_API_KEY", "azure-key"),
            ("AZURE_API_VERSION", "2024-10-21"),
            ("AZURE_MODEL_NAME", "gpt-4o"),
            ("AZURE_MODEL_NAME_O4_MINI", "o4-mini"),
        ]),
    );

    match registry.resolve("default").unwrap() {
        Provider::Azure {
            deployment,
            api_version,
            ..
        } => {
            assert_eq!(deployment, "gpt-4o");
            assert_eq!(api_version, "2024-10-21");
        }
        other => panic!("expected azure, got {:?}", other),
    }
    assert_eq!(registry.resolve("coding").unwrap().model(), "o4-mini");
}

#[test]
fn test_unset_credential_is_configuration_error() {
    let config = AgentryConfig::default();
    let registry = ProviderRegistry::with_env(
        &config,
        env_from(&[
            ("AZURE_BASE_URL", "https://example.openai.azure.com"),
            ("AZURE_MODEL_NAME", "gpt-4o"),
        ]),
    );

    let err = registry.resolve("default").unwrap_err();
    assert!(matches!(err, AppError::Configuration(msg) if msg.contains("AZURE_API_KEY")));
}

#[test]
fn test_factory_picks_model_from_hint() {
    let config = AgentryConfig::default();
    let registry = Arc::new(ProviderRegistry::with_env(&config, env_from(&[])));
    let factory = ConfigBasedLLMFactory::new(registry, &config.default_model);

    assert_eq!(factory.model_for(&catalog::coding_agent()), "coding");
    assert_eq!(factory.model_for(&catalog::weather_agent()), "default");
}
