//! Providers configuration file for batch runs.
//!
//! # Example Config File
//!
//! ```json
//! {
//!   "default_settings": {"temperature": 0.0, "max_tokens": 12000, "timeout": 120, "parallelism": 10},
//!   "providers": [
//!     {"name": "GPT-4o", "type": "openai", "model": "gpt-4o", "api_key": "${OPENAI_API_KEY}"},
//!     {"name": "Llama local", "type": "ollama", "model": "llama3", "base_url": "http://localhost:11434"}
//!   ]
//! }
//! ```
//!
//! A file with a `.toml` extension is read as TOML with the same layout
//! (`[default_settings]` and `[[providers]]` tables).

pub mod loader;
mod types;

pub use loader::{substitute_placeholders, ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use types::{DefaultSettings, ProviderEntry, ProvidersFile};
