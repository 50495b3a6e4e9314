//! TOML-based configuration for agentry
//!
//! Providers, model aliases and runtime limits are declared in a TOML file
//! (`agentry.toml` by default). Every section has defaults, so running without
//! a file yields the built-in Azure OpenAI setup driven by the usual
//! `AZURE_*` environment variables.
//!
//! Credentials are never stored in the file. Providers name the environment
//! variables that hold them and those are resolved lazily, per invocation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "agentry.toml";

/// Root configuration structure loaded from agentry.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentryConfig {
    /// Named LLM provider configurations
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,

    /// Named model aliases that reference providers
    #[serde(default = "default_models")]
    pub models: HashMap<String, ModelConfig>,

    /// Alias used when an agent does not ask for a specific model
    #[serde(default = "default_model_alias")]
    pub default_model: String,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AgentryConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            models: default_models(),
            default_model: default_model_alias(),
            execution: ExecutionConfig::default(),
            research: ResearchConfig::default(),
            weather: WeatherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_model_alias() -> String {
    "default".to_string()
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "azure".to_string(),
        ProviderConfig::Azure {
            endpoint_env: "AZURE_BASE_URL".to_string(),
            api_key_env: "AZURE_API_KEY".to_string(),
            api_version: default_azure_api_version(),
            api_version_env: Some("AZURE_API_VERSION".to_string()),
        },
    );
    providers
}

fn default_models() -> HashMap<String, ModelConfig> {
    let mut models = HashMap::new();
    models.insert(
        "default".to_string(),
        ModelConfig::from_env("azure", "AZURE_MODEL_NAME"),
    );
    models.insert(
        "coding".to_string(),
        ModelConfig::from_env("azure", "AZURE_MODEL_NAME_O4_MINI"),
    );
    models
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
    },
    Azure {
        /// Environment variable containing the resource endpoint
        endpoint_env: String,
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_azure_api_version")]
        api_version: String,
        /// Optional environment override for `api_version`
        #[serde(default)]
        api_version_env: Option<String>,
    },
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_azure_api_version() -> String {
    "2024-02-01".to_string()
}

impl ProviderConfig {
    /// Environment variables that must be set to use this provider
    pub fn required_env_vars(&self) -> Vec<&str> {
        match self {
            ProviderConfig::OpenAI { api_key_env, .. } => vec![api_key_env.as_str()],
            ProviderConfig::Azure {
                endpoint_env,
                api_key_env,
                ..
            } => vec![endpoint_env.as_str(), api_key_env.as_str()],
        }
    }
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    /// Literal model (or Azure deployment) name
    #[serde(default)]
    pub model: Option<String>,

    /// Environment variable holding the model name, used when `model` is unset
    #[serde(default)]
    pub model_env: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,
}

impl ModelConfig {
    pub fn from_env(provider: &str, model_env: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: None,
            model_env: Some(model_env.to_string()),
            temperature: None,
        }
    }
}

// ============= Runtime Sections =============

/// Limits applied to every agent invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Wall-clock budget for a whole invocation; unset means no limit
    #[serde(default)]
    pub invocation_timeout_secs: Option<u64>,
}

fn default_max_tool_iterations() -> usize {
    10
}

fn default_tool_timeout() -> u64 {
    30
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            tool_timeout_secs: default_tool_timeout(),
            invocation_timeout_secs: None,
        }
    }
}

impl ExecutionConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_secs.map(Duration::from_secs)
    }
}

/// Research pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchConfig {
    #[serde(default = "default_min_searches")]
    pub min_searches: usize,

    #[serde(default = "default_max_searches")]
    pub max_searches: usize,

    /// Reject plans whose size falls outside [min_searches, max_searches]
    #[serde(default = "default_true")]
    pub enforce_plan_size: bool,

    /// Upper bound on concurrently running searches; unset means all at once
    #[serde(default)]
    pub max_concurrent_searches: Option<usize>,
}

fn default_min_searches() -> usize {
    5
}

fn default_max_searches() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            min_searches: default_min_searches(),
            max_searches: default_max_searches(),
            enforce_plan_size: true,
            max_concurrent_searches: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConfig {
    /// Environment variable containing the OpenWeather API key
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_weather_base")]
    pub base_url: String,

    #[serde(default = "default_units")]
    pub default_units: String,
}

fn default_weather_key_env() -> String {
    "OPENWEATHER_API_KEY".to_string()
}

fn default_weather_base() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_weather_key_env(),
            base_url: default_weather_base(),
            default_units: default_units(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of the human format
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by model '{1}' does not exist")]
    MissingProvider(String, String),

    #[error("Model '{0}' is not defined")]
    MissingModel(String),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Configuration(err.to_string())
    }
}

impl AgentryConfig {
    /// Load configuration from a TOML file that must exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the file if present, otherwise fall back to the built-in configuration
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AgentryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation. Environment variables are not checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (model_name, model_config) in &self.models {
            if !self.providers.contains_key(&model_config.provider) {
                return Err(ConfigError::MissingProvider(
                    model_config.provider.clone(),
                    model_name.clone(),
                ));
            }
            if model_config.model.is_none() && model_config.model_env.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "Model '{}' needs either `model` or `model_env`",
                    model_name
                )));
            }
        }

        if !self.models.contains_key(&self.default_model) {
            return Err(ConfigError::MissingModel(self.default_model.clone()));
        }

        if self.execution.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "execution.max_tool_iterations must be at least 1".into(),
            ));
        }

        let research = &self.research;
        if research.min_searches == 0 || research.min_searches > research.max_searches {
            return Err(ConfigError::ValidationError(format!(
                "research bounds are invalid: min_searches={} max_searches={}",
                research.min_searches, research.max_searches
            )));
        }
        if research.max_concurrent_searches == Some(0) {
            return Err(ConfigError::ValidationError(
                "research.max_concurrent_searches must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Every credential or setting variable that is currently unset
    pub fn missing_env_vars(&self) -> Vec<String> {
        self.missing_env_vars_with(|name| std::env::var(name).ok())
    }

    /// Same as [`missing_env_vars`](Self::missing_env_vars) with a custom lookup
    pub fn missing_env_vars_with<F>(&self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut required: BTreeSet<&str> = BTreeSet::new();
        for model in self.models.values() {
            if let Some(provider) = self.providers.get(&model.provider) {
                required.extend(provider.required_env_vars());
            }
            if model.model.is_none() {
                if let Some(env) = &model.model_env {
                    required.insert(env.as_str());
                }
            }
        }
        required.insert(self.weather.api_key_env.as_str());

        required
            .into_iter()
            .filter(|name| lookup(name).map(|v| v.is_empty()).unwrap_or(true))
            .map(str::to_string)
            .collect()
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Get model by alias
    pub fn get_model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = AgentryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "default");
        assert!(config.get_model("coding").is_some());
        assert_eq!(config.execution.max_tool_iterations, 10);
        assert_eq!(config.research.min_searches, 5);
        assert_eq!(config.research.max_searches, 20);
        assert!(config.research.enforce_plan_size);
    }

    #[test]
    fn test_empty_file_yields_builtin_sections() {
        let config = AgentryConfig::from_toml_str("").unwrap();
        match config.get_provider("azure") {
            Some(ProviderConfig::Azure { api_version, .. }) => {
                assert_eq!(api_version, "2024-02-01")
            }
            other => panic!("unexpected provider: {:?}", other),
        }
        assert_eq!(config.weather.default_units, "metric");
    }

    #[test]
    fn test_parse_openai_provider() {
        let content = r#"
default_model = "fast"

[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"

[models.fast]
provider = "openai"
model = "gpt-4o-mini"
temperature = 0.2

[research]
max_concurrent_searches = 4
"#;
        let config = AgentryConfig::from_toml_str(content).unwrap();
        let provider = config.get_provider("openai").unwrap();
        assert_eq!(
            provider,
            &ProviderConfig::OpenAI {
                api_key_env: "OPENAI_API_KEY".to_string(),
                api_base: "https://api.openai.com/v1".to_string(),
            }
        );
        assert_eq!(config.research.max_concurrent_searches, Some(4));
    }

    #[test]
    fn test_missing_provider_reference() {
        let content = r#"
[models.default]
provider = "nowhere"
model = "gpt-4o"
"#;
        let err = AgentryConfig::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ConfigError::MissingProvider(p, m) if p == "nowhere" && m == "default"));
    }

    #[test]
    fn test_inverted_research_bounds_rejected() {
        let content = r#"
[research]
min_searches = 10
max_searches = 3
"#;
        let err = AgentryConfig::from_toml_str(content).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_env_vars_reports_unset_only() {
        let config = AgentryConfig::default();
        let missing = config.missing_env_vars_with(|name| match name {
            "AZURE_API_KEY" | "AZURE_MODEL_NAME" => Some("set".to_string()),
            "AZURE_BASE_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(
            missing,
            vec![
                "AZURE_BASE_URL".to_string(),
                "AZURE_MODEL_NAME_O4_MINI".to_string(),
                "OPENWEATHER_API_KEY".to_string(),
            ]
        );
    }
}
