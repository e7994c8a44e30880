//! Providers file loading.
//!
//! The file is parsed into a generic value first (JSON, or TOML for a
//! `.toml` extension), `${VAR}` placeholders are substituted from the
//! environment, and only then is the value deserialized into typed entries.

use super::types::{DefaultSettings, ProviderEntry, ProvidersFile};
use healthbench_core::ProviderKind;
use regex::{Captures, Regex};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Default providers file name.
pub const DEFAULT_CONFIG_PATH: &str = "providers.json";

/// Errors that can occur when loading the providers file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file does not exist
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read
    #[error("Failed to read {path}: {error}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying error message
        error: String,
    },

    /// The file is not valid JSON/TOML or has the wrong shape
    #[error("Failed to parse {path}: {error}")]
    Parse {
        /// Path of the file
        path: PathBuf,
        /// Underlying error message
        error: String,
    },

    /// The top-level `providers` key is absent
    #[error("Configuration must contain a 'providers' key: {}", .0.display())]
    MissingProviders(PathBuf),
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is a valid regex")
    })
}

/// Replace `${VAR}` placeholders using `lookup`.
///
/// Unset or empty variables leave their placeholder in place. If the result
/// is still a whole placeholder, the value is `None`.
pub fn substitute_placeholders<F>(value: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let substituted = placeholder_pattern().replace_all(value, |caps: &Captures| {
        match lookup(&caps[1]).filter(|v| !v.is_empty()) {
            Some(resolved) => resolved,
            None => caps[0].to_string(),
        }
    });

    if substituted.starts_with("${") && substituted.ends_with('}') {
        None
    } else {
        Some(substituted.into_owned())
    }
}

/// Apply [`substitute_placeholders`] to every string in `value`.
fn substitute_value<F>(value: Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => substitute_placeholders(&s, lookup)
            .map(Value::String)
            .unwrap_or(Value::Null),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute_value(item, lookup))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, substitute_value(item, lookup)))
                .collect(),
        ),
        other => other,
    }
}

/// Loaded providers configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    config: ProvidersFile,
}

impl ConfigLoader {
    /// Load `path`, substituting placeholders from the process environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load `path`, resolving placeholders with `lookup`.
    pub fn load_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };

        let loader = Self::parse_with(path, &contents, lookup)?;
        log::info!(
            "Loaded {} provider(s) from {}",
            loader.providers().len(),
            path.display()
        );
        Ok(loader)
    }

    /// Parse file contents. The format is chosen by `path`'s extension.
    pub fn parse_with<F>(path: &Path, contents: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_error = |error: String| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        };

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let raw: Value = if is_toml {
            toml::from_str(contents).map_err(|e| parse_error(e.to_string()))?
        } else {
            serde_json::from_str(contents).map_err(|e| parse_error(e.to_string()))?
        };

        if raw.get("providers").is_none() {
            return Err(ConfigError::MissingProviders(path.to_path_buf()));
        }

        let resolved = substitute_value(raw, &lookup);
        let config: ProvidersFile =
            serde_json::from_value(resolved).map_err(|e| parse_error(e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run-wide defaults.
    pub fn default_settings(&self) -> &DefaultSettings {
        &self.config.default_settings
    }

    /// All providers, in file order.
    pub fn providers(&self) -> &[ProviderEntry] {
        &self.config.providers
    }

    /// Look up a provider by exact name.
    pub fn get_provider(&self, name: &str) -> Option<&ProviderEntry> {
        self.config.providers.iter().find(|p| p.name == name)
    }

    /// All providers of a given type.
    pub fn providers_by_type(&self, kind: &str) -> Vec<&ProviderEntry> {
        self.config
            .providers
            .iter()
            .filter(|p| p.kind == kind)
            .collect()
    }

    /// Provider names, in file order.
    pub fn list_providers(&self) -> Vec<&str> {
        self.config.providers.iter().map(|p| p.name.as_str()).collect()
    }

    /// Problems that would prevent `provider` from running.
    pub fn validate_provider(&self, provider: &ProviderEntry) -> Vec<String> {
        validate_entry(provider)
    }

    /// Issues for every provider that has any, in file order.
    pub fn validate_all(&self) -> Vec<(String, Vec<String>)> {
        self.config
            .providers
            .iter()
            .filter_map(|p| {
                let issues = validate_entry(p);
                (!issues.is_empty()).then(|| (p.name.clone(), issues))
            })
            .collect()
    }
}

fn validate_entry(provider: &ProviderEntry) -> Vec<String> {
    let mut issues = Vec::new();
    let is_blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

    match ProviderKind::from_str(&provider.kind) {
        Ok(ProviderKind::OpenAi | ProviderKind::Maritaca) => {
            if is_blank(&provider.api_key) {
                issues.push(format!(
                    "API key missing for {} (type: {})",
                    provider.name, provider.kind
                ));
            }
        }
        Ok(ProviderKind::Bedrock) => {
            if is_blank(&provider.aws_bearer_token) {
                issues.push(format!("AWS bearer token missing for {}", provider.name));
            }
        }
        Ok(ProviderKind::Ollama) => {
            if is_blank(&provider.base_url) {
                issues.push(format!(
                    "Base URL missing for {} (type: ollama)",
                    provider.name
                ));
            }
        }
        Err(_) => issues.push(format!(
            "Unknown provider type '{}' for {}",
            provider.kind, provider.name
        )),
    }

    if provider.model.trim().is_empty() {
        issues.push(format!("Model missing for {}", provider.name));
    }
    issues
}
