//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizkit_core::traits::{CompletionSink, DefinitionSource, ResponseHistory};

use crate::fallback::default_questions;
use crate::local::LocalStore;
use crate::rest::RestStore;

/// Which backend holds quizzes and responses.
///
/// Note: Custom Debug impl masks credentials to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Local {
        #[serde(default = "default_quizzes_dir")]
        quizzes_dir: PathBuf,
        #[serde(default = "default_responses_path")]
        responses_path: PathBuf,
    },
    Rest {
        base_url: String,
        api_key: String,
        /// Signed-in user's token; the API key is used when absent.
        #[serde(default)]
        access_token: Option<String>,
        /// Serve quizzes without questions with the built-in defaults.
        #[serde(default)]
        use_default_questions: bool,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Local {
                quizzes_dir,
                responses_path,
            } => f
                .debug_struct("Local")
                .field("quizzes_dir", quizzes_dir)
                .field("responses_path", responses_path)
                .finish(),
            StoreConfig::Rest {
                base_url,
                api_key: _,
                access_token,
                use_default_questions,
            } => f
                .debug_struct("Rest")
                .field("base_url", base_url)
                .field("api_key", &"***")
                .field("access_token", &access_token.as_ref().map(|_| "***"))
                .field("use_default_questions", use_default_questions)
                .finish(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            quizzes_dir: default_quizzes_dir(),
            responses_path: default_responses_path(),
        }
    }
}

fn default_quizzes_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}

fn default_responses_path() -> PathBuf {
    PathBuf::from("./quizkit-results/responses.jsonl")
}

/// Top-level quizkit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizkitConfig {
    /// Backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// User id recorded with completions.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A configured backend, usable through every store trait.
#[derive(Clone)]
pub struct StoreHandle {
    pub source: Arc<dyn DefinitionSource>,
    pub sink: Arc<dyn CompletionSink>,
    pub history: Arc<dyn ResponseHistory>,
}

impl StoreHandle {
    fn from_store<S>(store: S) -> Self
    where
        S: DefinitionSource + CompletionSink + ResponseHistory + 'static,
    {
        let store = Arc::new(store);
        Self {
            source: store.clone(),
            sink: store.clone(),
            history: store,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
        from = start + value.len();
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Local { .. } => config.clone(),
        StoreConfig::Rest {
            base_url,
            api_key,
            access_token,
            use_default_questions,
        } => StoreConfig::Rest {
            base_url: resolve_env_vars(base_url),
            api_key: resolve_env_vars(api_key),
            access_token: access_token.as_deref().map(resolve_env_vars),
            use_default_questions: *use_default_questions,
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizkit.toml` in the current directory
/// 2. `~/.config/quizkit/config.toml`
///
/// Environment variable overrides: `QUIZKIT_API_KEY`, `QUIZKIT_USER`.
pub fn load_config() -> Result<QuizkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizkit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizkitConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZKIT_API_KEY") {
        if let StoreConfig::Rest { api_key, .. } = &mut config.store {
            *api_key = key;
        }
    }
    if let Ok(user) = std::env::var("QUIZKIT_USER") {
        config.user_id = Some(user);
    }

    config.store = resolve_store_config(&config.store);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizkit"))
}

/// Create a store from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<StoreHandle> {
    match config {
        StoreConfig::Local {
            quizzes_dir,
            responses_path,
        } => Ok(StoreHandle::from_store(LocalStore::new(
            quizzes_dir.clone(),
            responses_path.clone(),
        ))),
        StoreConfig::Rest {
            base_url,
            api_key,
            access_token,
            use_default_questions,
        } => {
            anyhow::ensure!(!api_key.is_empty(), "rest store requires an api_key");
            let mut store = RestStore::new(base_url, api_key)?.with_access_token(access_token.clone());
            if *use_default_questions {
                store = store.with_fallback_questions(default_questions());
            }
            Ok(StoreHandle::from_store(store))
        }
    }
}
