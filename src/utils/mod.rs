/// TOML-based configuration (agentry.toml)
pub mod toml_config;
