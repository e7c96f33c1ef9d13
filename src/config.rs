//! Process configuration
//!
//! Built once in `main` from environment variables and passed by reference.
//!
//! - `AI_SHELL_PROVIDER`: `gemini` (default) or `openai`
//! - `GOOGLE_API_KEY` or `GEMINI_API_KEY`: key for Gemini
//! - `OPENAI_API_KEY`: key for OpenAI
//! - `AI_SHELL_MODEL`: model name, defaults per provider
//! - `AI_SHELL_BASE_URL`: API base override
//! - `AI_SHELL_TIMEOUT_SECS`: HTTP request timeout (default 30)
//! - `AI_SHELL_MAX_ROUNDS`: model round cap (default 10)
//! - `AI_SHELL_MAX_RETRIES`: invalid answers tolerated (default 3)
//! - `AI_SHELL_LOG_DIR`: log directory

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::agent::AgentSettings;
use crate::llm::{gemini, openai, GeminiProvider, LlmProvider, OpenAiProvider, DEFAULT_TIMEOUT};

/// Which model API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => gemini::DEFAULT_MODEL,
            Self::OpenAi => openai::DEFAULT_MODEL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => bail!("unknown provider `{}` (expected `gemini` or `openai`)", other),
        }
    }
}

/// Everything the process needs, resolved up front
#[derive(Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub agent: AgentSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("agent", &self.agent)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        tracing::info!("Loading configuration from environment");
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("AI_SHELL_PROVIDER") {
            Some(name) => name.parse()?,
            None => ProviderKind::Gemini,
        };

        let api_key = match provider {
            ProviderKind::Gemini => get("GOOGLE_API_KEY")
                .or_else(|| get("GEMINI_API_KEY"))
                .context("GOOGLE_API_KEY (or GEMINI_API_KEY) environment variable not set")?,
            ProviderKind::OpenAi => {
                get("OPENAI_API_KEY").context("OPENAI_API_KEY environment variable not set")?
            }
        };

        let model = get("AI_SHELL_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let base_url = get("AI_SHELL_BASE_URL");

        let timeout = match parse_var::<u64>(&get, "AI_SHELL_TIMEOUT_SECS")? {
            Some(0) => bail!("AI_SHELL_TIMEOUT_SECS must be greater than zero"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let mut agent = AgentSettings::default();
        if let Some(rounds) = parse_var::<usize>(&get, "AI_SHELL_MAX_ROUNDS")? {
            if rounds == 0 {
                bail!("AI_SHELL_MAX_ROUNDS must be greater than zero");
            }
            agent.max_rounds = rounds;
        }
        if let Some(retries) = parse_var::<usize>(&get, "AI_SHELL_MAX_RETRIES")? {
            agent.max_schema_retries = retries;
        }

        tracing::info!("Using provider {:?}, model {}", provider, model);
        if let Some(ref url) = base_url {
            tracing::info!("Using custom base URL: {}", url);
        }

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            timeout,
            agent,
        })
    }

    /// Build the configured model provider
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>> {
        let provider: Arc<dyn LlmProvider> = match self.provider {
            ProviderKind::Gemini => {
                let mut p = GeminiProvider::new(self.api_key.clone())?
                    .with_model(self.model.clone())
                    .with_timeout(self.timeout)?;
                if let Some(ref url) = self.base_url {
                    p = p.with_base_url(url.clone());
                }
                Arc::new(p)
            }
            ProviderKind::OpenAi => {
                let mut p = OpenAiProvider::new(self.api_key.clone())?
                    .with_model(self.model.clone())
                    .with_timeout(self.timeout)?;
                if let Some(ref url) = self.base_url {
                    p = p.with_base_url(url.clone());
                }
                Arc::new(p)
            }
        };
        Ok(provider)
    }
}

/// Directory for log files: `AI_SHELL_LOG_DIR` or a folder under the temp dir
pub fn log_dir() -> PathBuf {
    std::env::var_os("AI_SHELL_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("ai-shell").join("logs"))
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}
