//! Configuration file support for the colpali CLI.
//!
//! Settings live in `.colpali/config.toml`. Discovery searches for that file
//! starting from the current directory and walking up to parent directories.
//! Command-line flags and environment variables override anything read here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colpali_store::{DEFAULT_INDEX_NAME, DemoOptions, EMBEDDING_DIMENSION, PineconeConfig};
use serde::{Deserialize, Serialize};

/// The colpali data directory name.
pub const COLPALI_DIR: &str = ".colpali";
/// The config file name within the colpali directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Pinecone connection settings.
    pub pinecone: PineconeSection,
    /// Embedding settings.
    pub embedding: EmbeddingSection,
    /// Demonstration settings.
    pub demo: DemoSection,
}

/// Pinecone connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PineconeSection {
    /// Pinecone API key (or use PINECONE_API_KEY env var).
    pub api_key: Option<String>,
    /// Index to store documents in.
    pub index: String,
    /// Control plane URL override.
    pub control_plane_url: Option<String>,
    /// Namespace for all records.
    pub namespace: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PineconeSection {
    fn default() -> Self {
        Self {
            api_key: None,
            index: DEFAULT_INDEX_NAME.to_string(),
            control_plane_url: None,
            namespace: None,
            timeout_secs: 30,
        }
    }
}

/// Embedding settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingSection {
    /// Vector length; must match the index dimension.
    pub dimension: usize,
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            dimension: EMBEDDING_DIMENSION,
        }
    }
}

/// Demonstration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoSection {
    /// Results requested by the demo search.
    pub top_k: usize,
    /// Pause between storing and searching, in milliseconds.
    pub indexing_delay_ms: u64,
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            top_k: colpali_store::DEMO_TOP_K,
            indexing_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Find and load configuration from current or parent directories.
    pub fn find_and_load() -> Result<Option<(Self, PathBuf)>> {
        let current = std::env::current_dir()?;
        Self::find_and_load_from(&current)
    }

    /// Find and load configuration starting from a specific directory.
    ///
    /// Returns the config and the path of the file it was read from.
    pub fn find_and_load_from(start: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start.to_path_buf();

        loop {
            let config_path = dir.join(COLPALI_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Pick the API key: explicit value first, then the config file.
    ///
    /// Blank keys count as missing.
    pub fn resolve_api_key(&self, explicit: Option<String>) -> Option<String> {
        explicit
            .or_else(|| self.pinecone.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    /// Pick the index name: explicit value first, then the config file.
    pub fn resolve_index(&self, explicit: Option<String>) -> String {
        explicit.unwrap_or_else(|| self.pinecone.index.clone())
    }

    /// Build the provider configuration for the given key.
    pub fn pinecone_config(&self, api_key: String) -> PineconeConfig {
        let mut config = PineconeConfig::new(api_key)
            .with_timeout(Duration::from_secs(self.pinecone.timeout_secs));
        if let Some(ref url) = self.pinecone.control_plane_url {
            config = config.with_control_plane_url(url);
        }
        if let Some(ref namespace) = self.pinecone.namespace {
            config = config.with_namespace(namespace);
        }
        config
    }

    /// Demonstration options from the `[demo]` section.
    pub fn demo_options(&self) -> DemoOptions {
        DemoOptions {
            top_k: self.demo.top_k,
            indexing_delay: Duration::from_millis(self.demo.indexing_delay_ms),
            ..Default::default()
        }
    }

    /// Render the default configuration as TOML, without an API key.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to render default config")
    }
}

/// Configuration validation error.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigValidationError {}

impl Config {
    /// Validate the configuration.
    ///
    /// Returns a list of validation errors if any are found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.pinecone.index.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "pinecone.index".to_string(),
                message: "Index name cannot be empty.".to_string(),
            });
        }

        if self.pinecone.timeout_secs == 0 {
            errors.push(ConfigValidationError {
                field: "pinecone.timeout_secs".to_string(),
                message: "Timeout must be at least one second.".to_string(),
            });
        }

        if self.embedding.dimension == 0 {
            errors.push(ConfigValidationError {
                field: "embedding.dimension".to_string(),
                message: "Embedding dimension must be positive.".to_string(),
            });
        }

        if self.demo.top_k == 0 {
            errors.push(ConfigValidationError {
                field: "demo.top_k".to_string(),
                message: "Demo top_k must be positive.".to_string(),
            });
        }

        errors
    }
}
