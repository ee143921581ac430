//! # Environment Configuration
//!
//! Dotenv loading and the settings the agent reads from the environment.
//! Dotenv files never override variables that are already set.

use crate::error::{self, Error, Result};
use crate::provider::{ProviderConfig, ProviderType, DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::debug;

pub const ENV_DOTENV_PATH: &str = "DOTENV_PATH";
pub const ENV_PROVIDER: &str = "NEURORF_PROVIDER";
pub const ENV_MODEL: &str = "NEURORF_MODEL";
pub const ENV_BASE_URL: &str = "NEURORF_BASE_URL";
pub const ENV_USE_PYAEDT: &str = "USE_PYAEDT";

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Variables reported by `env_info` in the CLI
pub const ENV_KEYS: &[&str] = &[
    "GOOGLE_API_KEY",
    "OPENAI_API_KEY",
    ENV_PROVIDER,
    ENV_MODEL,
    ENV_BASE_URL,
    ENV_USE_PYAEDT,
    ENV_DOTENV_PATH,
];

static DEFAULT_ENV: Once = Once::new();

/// Load dotenv files.
///
/// An explicit path loads only that file. Otherwise `DOTENV_PATH` is used if
/// set, else `.env.local` then `.env` from the working directory; this
/// discovery runs once per process. Missing files are skipped. Returns the
/// files actually loaded.
pub fn load_env(path: Option<&Path>) -> Result<Vec<PathBuf>> {
    if let Some(path) = path {
        return load_files(&[path.to_path_buf()]);
    }

    let mut outcome = Ok(Vec::new());
    DEFAULT_ENV.call_once(|| {
        let candidates = match std::env::var(ENV_DOTENV_PATH) {
            Ok(p) if !p.is_empty() => vec![PathBuf::from(p)],
            _ => vec![PathBuf::from(".env.local"), PathBuf::from(".env")],
        };
        outcome = load_files(&candidates);
    });
    outcome
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut loaded = Vec::new();
    for path in paths {
        match dotenvy::from_path(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Loaded env file");
                loaded.push(path.clone());
            }
            Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Env file not found, skipping");
            }
            Err(e) => {
                return Err(Error::config_invalid(format!(
                    "failed to load env file {}",
                    path.display()
                ))
                .with_operation("config::load_env")
                .with_context("path", path.display().to_string())
                .set_source(e));
            }
        }
    }
    Ok(loaded)
}

/// Masked view of one environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarInfo {
    pub name: String,
    pub present: bool,
    pub len: usize,
}

/// Presence and length of each variable; values are never exposed
pub fn env_info(keys: &[&str]) -> Vec<EnvVarInfo> {
    keys.iter()
        .map(|key| {
            let value = std::env::var(key).ok();
            EnvVarInfo {
                name: key.to_string(),
                present: value.is_some(),
                len: value.map(|v| v.len()).unwrap_or(0),
            }
        })
        .collect()
}

/// Command-line overrides applied on top of the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<ProviderType>,
    pub model: Option<String>,
}

/// Resolved runtime settings
#[derive(Clone)]
pub struct Settings {
    pub provider: ProviderType,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub use_pyaedt: bool,
    pub temperature: f32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&Overrides::default())
    }

    pub fn from_env_with(overrides: &Overrides) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve settings from any variable source
    pub fn from_lookup<F>(lookup: F, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match overrides.provider {
            Some(provider) => provider,
            None => match non_empty(ENV_PROVIDER) {
                Some(name) => name.parse()?,
                None => ProviderType::Gemini,
            },
        };

        let model = overrides
            .model
            .clone()
            .or_else(|| non_empty(ENV_MODEL))
            .unwrap_or_else(|| default_model(provider).to_string());

        let key_var = provider.api_key_var();
        let api_key = non_empty(key_var).ok_or_else(|| {
            error::missing_env(key_var)
                .with_operation("config::settings")
                .with_context("provider", provider.as_str())
        })?;

        let use_pyaedt = lookup(ENV_USE_PYAEDT)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            provider,
            model,
            api_key,
            base_url: non_empty(ENV_BASE_URL),
            use_pyaedt,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Provider configuration for these settings
    pub fn provider_config(&self) -> ProviderConfig {
        let config = match self.provider {
            ProviderType::Gemini => ProviderConfig::gemini(self.api_key.clone()),
            ProviderType::OpenAI => ProviderConfig::openai(self.api_key.clone()),
        }
        .with_model(self.model.clone());

        match &self.base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("base_url", &self.base_url)
            .field("use_pyaedt", &self.use_pyaedt)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_model(provider: ProviderType) -> &'static str {
    match provider {
        ProviderType::Gemini => DEFAULT_GEMINI_MODEL,
        ProviderType::OpenAI => DEFAULT_OPENAI_MODEL,
    }
}
