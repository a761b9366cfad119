//! Configuration management for the Retention Copilot.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.copilot/config.yaml` in the workspace, or `COPILOT_CONFIG`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! Relative data paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the generation client factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Embedding providers the semantic index can be built with.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .copilot/ and data/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("gemini" or "ollama")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Environment variable holding the remote-service credential
    pub api_key_env: String,

    /// Remote-service credential
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Embedding provider ("trigram" or "ollama")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimensions
    pub embedding_dimensions: usize,

    /// Base URL for a remote embedding provider
    pub embedding_endpoint: Option<String>,

    /// Retrieval fan-out
    pub top_k: usize,

    /// Knowledge corpus location (JSON array of {title, content})
    pub knowledge_path: PathBuf,

    /// Subscriber snapshot location (SQLite)
    pub db_path: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalSection>,
    data: Option<DataSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "embeddingProvider")]
    embedding_provider: Option<String>,
    #[serde(rename = "embeddingModel")]
    embedding_model: Option<String>,
    dimensions: Option<usize>,
    #[serde(rename = "embeddingEndpoint")]
    embedding_endpoint: Option<String>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "knowledgePath")]
    knowledge_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataSection {
    #[serde(rename = "dbPath")]
    db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            embedding_provider: "trigram".to_string(),
            embedding_model: "trigram-v1".to_string(),
            embedding_dimensions: 384,
            embedding_endpoint: None,
            top_k: 3,
            knowledge_path: PathBuf::from("data/telecom_knowledge.json"),
            db_path: PathBuf::from("data/subscriber_sample.db"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `COPILOT_WORKSPACE`, `COPILOT_CONFIG`
    /// - `COPILOT_PROVIDER`, `COPILOT_MODEL`, `COPILOT_ENDPOINT`
    /// - `COPILOT_API_KEY`, or the variable named by `api_key_env` (default `GEMINI_API_KEY`)
    /// - `COPILOT_EMBEDDING_PROVIDER`, `COPILOT_EMBEDDING_MODEL`, `COPILOT_EMBEDDING_ENDPOINT`
    /// - `COPILOT_TOP_K`
    /// - `COPILOT_KNOWLEDGE_PATH`, `COPILOT_DB_PATH`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use copilot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment.
    pub fn load_from<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = lookup("COPILOT_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = lookup("COPILOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.copilot_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Some(provider) = lookup("COPILOT_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = lookup("COPILOT_MODEL") {
            config.model = model;
        }

        if let Some(endpoint) = lookup("COPILOT_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Some(provider) = lookup("COPILOT_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Some(model) = lookup("COPILOT_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if let Some(endpoint) = lookup("COPILOT_EMBEDDING_ENDPOINT") {
            config.embedding_endpoint = Some(endpoint);
        }

        if let Some(top_k) = lookup("COPILOT_TOP_K") {
            config.top_k = top_k.trim().parse().map_err(|_| {
                AppError::Config(format!("COPILOT_TOP_K must be a positive integer, got {:?}", top_k))
            })?;
        }

        if let Some(path) = lookup("COPILOT_KNOWLEDGE_PATH") {
            config.knowledge_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("COPILOT_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        config.api_key = lookup("COPILOT_API_KEY")
            .or_else(|| lookup(&config.api_key_env))
            .filter(|key| !key.trim().is_empty());

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = api_key_env;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(provider) = retrieval.embedding_provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = retrieval.embedding_model {
                result.embedding_model = model;
            }
            if let Some(dimensions) = retrieval.dimensions {
                result.embedding_dimensions = dimensions;
            }
            if retrieval.embedding_endpoint.is_some() {
                result.embedding_endpoint = retrieval.embedding_endpoint;
            }
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
            if let Some(path) = retrieval.knowledge_path {
                result.knowledge_path = path;
            }
        }

        if let Some(data) = config_file.data {
            if let Some(path) = data.db_path {
                result.db_path = path;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .copilot directory.
    pub fn copilot_dir(&self) -> PathBuf {
        self.workspace.join(".copilot")
    }

    /// Knowledge corpus path, resolved against the workspace.
    pub fn knowledge_file(&self) -> PathBuf {
        self.resolve(&self.knowledge_path)
    }

    /// Subscriber database path, resolved against the workspace.
    pub fn database_file(&self) -> PathBuf {
        self.resolve(&self.db_path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Whether the active provider needs a remote-service credential.
    pub fn requires_api_key(&self) -> bool {
        self.provider.eq_ignore_ascii_case("gemini")
    }

    /// Validate configuration before any request is served.
    ///
    /// A missing credential for a provider that needs one is fatal here,
    /// so the process never starts half-configured.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.requires_api_key() && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} is not set. Export it or add it to your environment.",
                self.api_key_env
            )));
        }

        let embedding_provider = self.embedding_provider.to_lowercase();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.embedding_dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
