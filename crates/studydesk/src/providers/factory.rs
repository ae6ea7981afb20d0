use std::sync::Arc;

use super::{
    base::Provider, configs::ProviderConfig, gemini::GeminiProvider, openai::OpenAiProvider,
};
use anyhow::Result;
use strum_macros::{Display, EnumIter};

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    #[strum(serialize = "gemini")]
    Gemini,
    #[strum(serialize = "openai")]
    OpenAi,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::Gemini(_) => ProviderType::Gemini,
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Arc<dyn Provider>> {
    match config {
        ProviderConfig::Gemini(gemini_config) => {
            Ok(Arc::new(GeminiProvider::new(gemini_config)?))
        }
        ProviderConfig::OpenAi(openai_config) => {
            Ok(Arc::new(OpenAiProvider::new(openai_config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{GeminiProviderConfig, GEMINI_HOST};
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_type_names() {
        let names: Vec<String> = ProviderType::iter().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["gemini", "openai"]);
    }

    #[test]
    fn test_get_provider_from_config() {
        let config = ProviderConfig::Gemini(GeminiProviderConfig {
            host: GEMINI_HOST.to_string(),
            api_key: "test-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            reasoning_model: "gemini-2.5-pro".to_string(),
            temperature: None,
            max_tokens: None,
        });
        assert_eq!(config.provider_type(), ProviderType::Gemini);
        assert!(get_provider(config).is_ok());
    }
}
