use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_MAX_HISTORY_MESSAGES: usize = 20;

const DEFAULT_SYSTEM_PROMPT: &str = "You are Careerist, a friendly career guidance assistant. \
Help users with job searching, resumes, interviews, skill development and career planning. \
Answer concisely and keep the conversation context in mind.";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub provider: ProviderBackend,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub assistant: AssistantConfig,
    pub session_store: SessionStoreConfig,
    pub defaults: FormDefaults,
    pub logging: LoggingConfig,
}

/// Which collaborator implementations back the query processor and synthesizer.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderBackend {
    /// Gemini for answers, Google Cloud Text-to-Speech for audio.
    Google,
    /// Deterministic offline providers.
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model used to answer questions (e.g., gemini-2.0-flash)
    pub text_model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub system_prompt: String,
    /// How many of the most recent transcript messages are sent with each query.
    pub max_history_messages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStoreConfig {
    pub backend: SessionStoreBackend,
    pub mongodb: Option<MongoConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreBackend {
    Memory,
    MongoDb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Values used when optional form or query fields are omitted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FormDefaults {
    /// Defaults to `default_session`.
    pub session_id: String,
    /// Defaults to `en`.
    pub lang: String,
    /// Defaults to `male`.
    pub voice: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            session_id: "default_session".to_string(),
            lang: "en".to_string(),
            voice: "male".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub otlp_endpoint: Option<String>,
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider: ProviderBackend = get_env("CHATBOT_PROVIDER", Some("google"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The key is only mandatory when a real provider will use it.
        let api_key = match provider {
            ProviderBackend::Google => get_env("GOOGLE_API_KEY", None, is_prod)?,
            ProviderBackend::Mock => env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        let backend: SessionStoreBackend =
            get_env("SESSION_STORE_BACKEND", Some("memory"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let mongodb = match backend {
            SessionStoreBackend::MongoDb => Some(MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("chatbot_db"), is_prod)?,
            }),
            SessionStoreBackend::Memory => None,
        };

        let form_defaults = FormDefaults::default();

        Ok(ChatbotConfig {
            common: common_config,
            provider,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
            },
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                temperature: parse_optional("GENAI_TEMPERATURE")?,
                max_output_tokens: parse_optional("GENAI_MAX_OUTPUT_TOKENS")?,
            },
            assistant: AssistantConfig {
                system_prompt: env::var("CHATBOT_SYSTEM_PROMPT")
                    .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
                max_history_messages: parse_optional("CHATBOT_MAX_HISTORY_MESSAGES")?
                    .unwrap_or(DEFAULT_MAX_HISTORY_MESSAGES),
            },
            session_store: SessionStoreConfig { backend, mongodb },
            defaults: FormDefaults {
                session_id: env::var("CHATBOT_DEFAULT_SESSION_ID")
                    .unwrap_or(form_defaults.session_id),
                lang: env::var("CHATBOT_DEFAULT_LANG").unwrap_or(form_defaults.lang),
                voice: env::var("CHATBOT_DEFAULT_VOICE").unwrap_or(form_defaults.voice),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

impl std::str::FromStr for ProviderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gemini" => Ok(ProviderBackend::Google),
            "mock" => Ok(ProviderBackend::Mock),
            _ => Err(format!("Invalid provider backend: {}", s)),
        }
    }
}

impl std::str::FromStr for SessionStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(SessionStoreBackend::Memory),
            "mongodb" | "mongo" => Ok(SessionStoreBackend::MongoDb),
            _ => Err(format!("Invalid session store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_optional<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().parse().map(Some).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, e))
        }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_defaults_match_documented_values() {
        let defaults = FormDefaults::default();
        assert_eq!(defaults.session_id, "default_session");
        assert_eq!(defaults.lang, "en");
        assert_eq!(defaults.voice, "male");
    }

    #[test]
    fn backends_parse_case_insensitively() {
        assert_eq!("Mock".parse::<ProviderBackend>(), Ok(ProviderBackend::Mock));
        assert_eq!("gemini".parse::<ProviderBackend>(), Ok(ProviderBackend::Google));
        assert_eq!(
            "MongoDB".parse::<SessionStoreBackend>(),
            Ok(SessionStoreBackend::MongoDb)
        );
        assert!("redis".parse::<SessionStoreBackend>().is_err());
    }

    #[test]
    fn missing_required_value_is_config_error() {
        let err = get_env("CHATBOT_TEST_SURELY_UNSET_KEY", None, false).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let value = get_env("CHATBOT_TEST_SURELY_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }
}
