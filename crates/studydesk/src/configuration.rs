use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::providers::configs::{
    GeminiProviderConfig, OpenAiProviderConfig, ProviderConfig, GEMINI_HOST, GEMINI_MODEL,
    GEMINI_REASONING_MODEL, OPENAI_HOST, OPENAI_MODEL, OPENAI_REASONING_MODEL,
};
use crate::providers::factory::ProviderType;

pub const ENV_PREFIX: &str = "STUDYDESK";

/// Credentials picked up when `STUDYDESK_PROVIDER__API_KEY` is not set
const GEMINI_KEY_FALLBACKS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
const OPENAI_KEY_FALLBACKS: &[&str] = &["OPENAI_API_KEY"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration, set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a config key (`provider.api_key` or a bare field name) to its environment variable
pub fn to_env_var(field: &str) -> String {
    let path = if field.contains('.') {
        field.to_string()
    } else {
        format!("provider.{}", field)
    };
    format!("{}_{}", ENV_PREFIX, path.replace('.', "__").to_uppercase())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    Gemini {
        #[serde(default = "default_gemini_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default = "default_gemini_reasoning_model")]
        reasoning_model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default = "default_openai_reasoning_model")]
        reasoning_model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::Gemini { .. } => ProviderType::Gemini,
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
        }
    }

    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::Gemini {
                host,
                api_key,
                model,
                reasoning_model,
                temperature,
                max_tokens,
            } => ProviderConfig::Gemini(GeminiProviderConfig {
                host,
                api_key,
                model,
                reasoning_model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                reasoning_model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                reasoning_model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
}

impl Settings {
    /// Load from the default config file (if present) and the environment
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate(default_config_path().as_deref())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_and_validate(Some(path))
    }

    fn builder(
        config_file: Option<&Path>,
        api_key: Option<String>,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let mut builder = Config::builder().set_default("provider.type", "gemini")?;
        if let Some(key) = api_key {
            builder = builder.set_default("provider.api_key", key)?;
        }
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(false));
        }

        // Layer on the environment variables
        Ok(builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        ))
    }

    fn load_and_validate(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        // First pass decides which provider we talk to and whether a key was given
        let base = Self::builder(config_file, None)?.build()?;
        let fallback_key = if base.get_string("provider.api_key").is_ok() {
            None
        } else {
            let provider_type = base
                .get_string("provider.type")
                .unwrap_or_else(|_| ProviderType::Gemini.to_string());
            fallback_api_key(&provider_type)
        };

        let config = Self::builder(config_file, fallback_key)?.build()?;
        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `api_key`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .split('`')
                        .next()
                        .unwrap_or_default();
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn fallback_api_key(provider_type: &str) -> Option<String> {
    let candidates = if provider_type == ProviderType::OpenAi.to_string() {
        OPENAI_KEY_FALLBACKS
    } else {
        GEMINI_KEY_FALLBACKS
    };
    candidates
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("studydesk").join("config.toml"))
}

fn default_gemini_host() -> String {
    GEMINI_HOST.to_string()
}

fn default_gemini_model() -> String {
    GEMINI_MODEL.to_string()
}

fn default_gemini_reasoning_model() -> String {
    GEMINI_REASONING_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_openai_reasoning_model() -> String {
    OPENAI_REASONING_MODEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("STUDYDESK_") {
                env::remove_var(&key);
            }
        }
        for key in GEMINI_KEY_FALLBACKS.iter().chain(OPENAI_KEY_FALLBACKS) {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("STUDYDESK_PROVIDER__API_KEY", "test-key");

        let settings = Settings::load_and_validate(None).unwrap();
        assert_eq!(settings.provider.provider_type(), ProviderType::Gemini);
        if let ProviderSettings::Gemini {
            host,
            api_key,
            model,
            reasoning_model,
            temperature,
            max_tokens,
        } = settings.provider
        {
            assert_eq!(host, GEMINI_HOST);
            assert_eq!(api_key, "test-key");
            assert_eq!(model, "gemini-2.5-flash");
            assert_eq!(reasoning_model, "gemini-2.5-pro");
            assert_eq!(temperature, None);
            assert_eq!(max_tokens, None);
        } else {
            panic!("Expected Gemini provider");
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_gemini_key_fallback() {
        clean_env();
        env::set_var("API_KEY", "fallback-key");

        let settings = Settings::load_and_validate(None).unwrap();
        if let ProviderSettings::Gemini { api_key, .. } = settings.provider {
            assert_eq!(api_key, "fallback-key");
        } else {
            panic!("Expected Gemini provider");
        }

        env::set_var("GEMINI_API_KEY", "preferred-key");
        let settings = Settings::load_and_validate(None).unwrap();
        if let ProviderSettings::Gemini { api_key, .. } = settings.provider {
            assert_eq!(api_key, "preferred-key");
        } else {
            panic!("Expected Gemini provider");
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_openai_settings() {
        clean_env();
        env::set_var("STUDYDESK_PROVIDER__TYPE", "openai");
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("STUDYDESK_PROVIDER__MODEL", "gpt-4.1-mini");
        env::set_var("STUDYDESK_PROVIDER__MAX_TOKENS", "2000");

        let settings = Settings::load_and_validate(None).unwrap();
        if let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            reasoning_model,
            max_tokens,
            ..
        } = settings.provider
        {
            assert_eq!(host, OPENAI_HOST);
            assert_eq!(api_key, "sk-test");
            assert_eq!(model, "gpt-4.1-mini");
            assert_eq!(reasoning_model, "gpt-4o");
            assert_eq!(max_tokens, Some(2000));
        } else {
            panic!("Expected OpenAI provider");
        }

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        let err = Settings::load_and_validate(None).unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert_eq!(env_var, "STUDYDESK_PROVIDER__API_KEY")
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_file_then_environment_override() {
        clean_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("config.toml");
        fs::write(
            &file_path,
            "[provider]\ntype = \"gemini\"\napi_key = \"file-key\"\nmodel = \"gemini-2.0-flash\"\n",
        )
        .unwrap();
        env::set_var("STUDYDESK_PROVIDER__MODEL", "gemini-2.5-flash-lite");

        let settings = Settings::from_file(&file_path).unwrap();
        if let ProviderSettings::Gemini { api_key, model, .. } = settings.provider {
            assert_eq!(api_key, "file-key");
            assert_eq!(model, "gemini-2.5-flash-lite");
        } else {
            panic!("Expected Gemini provider");
        }

        clean_env();
    }

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("api_key"), "STUDYDESK_PROVIDER__API_KEY");
        assert_eq!(to_env_var("provider.host"), "STUDYDESK_PROVIDER__HOST");
    }

    #[test]
    fn test_into_config() {
        let settings = ProviderSettings::OpenAi {
            host: OPENAI_HOST.to_string(),
            api_key: "k".to_string(),
            model: OPENAI_MODEL.to_string(),
            reasoning_model: OPENAI_REASONING_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        };
        assert_eq!(settings.into_config().provider_type(), ProviderType::OpenAi);
    }
}
