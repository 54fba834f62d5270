//! Configuration management for Memoria
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Missing credentials never fail loading: the affected collaborators are
//! simply marked unavailable when the services start.

use crate::error::{Result, MemoriaError};
use crate::matcher::ScoreTiers;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Memoria
///
/// Holds everything both gateways need: listener settings, API-key
/// enforcement, collaborator endpoints and credentials, storage paths,
/// and the tunable constants of the retry wrapper and fuzzy matcher.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// API key enforcement for the assistant endpoints
    #[serde(default)]
    pub auth: AuthConfig,
    /// Google Cloud REST endpoints (vision, speech, text-to-speech)
    #[serde(default)]
    pub google: GoogleConfig,
    /// Generative model used by the retrieval gateway
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Embedding endpoint used by the retrieval gateway
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Memory store location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Vector store used by the retrieval gateway
    #[serde(default)]
    pub vector: VectorConfig,
    /// Outbound retry policy
    #[serde(default)]
    pub retry: RetryConfig,
    /// Fuzzy memory matcher constants
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// Product catalog lookups
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Audio handling for voice uploads
    #[serde(default)]
    pub audio: AudioConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the assistant gateway
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port of the retrieval gateway
    #[serde(default = "default_retrieval_port")]
    pub retrieval_port: u16,

    /// Largest accepted image or audio payload (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_retrieval_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            retrieval_port: default_retrieval_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// API key enforcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Reject requests without a matching `X-API-Key` header
    #[serde(default)]
    pub api_key_required: bool,

    /// The static key clients must present
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "development-key".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_required: false,
            api_key: default_api_key(),
        }
    }
}

/// Google Cloud REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Credential file holding an `api_key` field, used when `api_key` is unset
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Base URL of the Vision API
    #[serde(default = "default_vision_base")]
    pub vision_base: String,

    /// Base URL of the Speech-to-Text API
    #[serde(default = "default_speech_base")]
    pub speech_base: String,

    /// Base URL of the Text-to-Speech API
    #[serde(default = "default_tts_base")]
    pub tts_base: String,

    /// Per-request timeout for Google calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_vision_base() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_speech_base() -> String {
    "https://speech.googleapis.com".to_string()
}

fn default_tts_base() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            credentials_file: None,
            vision_base: default_vision_base(),
            speech_base: default_speech_base(),
            tts_base: default_tts_base(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Credential file layout
#[derive(Debug, Deserialize)]
struct CredentialFile {
    api_key: String,
}

impl GoogleConfig {
    /// Resolve the API key from the inline value or the credential file
    ///
    /// Returns `None` (with a warning) when no usable credential exists.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        let path = self.credentials_file.as_ref()?;
        if !path.exists() {
            tracing::warn!(
                "Google credentials file not found at {}. Cloud features will be limited.",
                path.display()
            );
            return None;
        }

        match read_credential_file(path) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::error!("Failed to read Google credentials: {}", e);
                None
            }
        }
    }
}

fn read_credential_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| MemoriaError::Config(format!("Failed to read credentials file: {}", e)))?;
    // YAML is a superset of JSON, so one parser covers both layouts.
    let credentials: CredentialFile = serde_yaml::from_str(&contents)
        .map_err(|e| MemoriaError::Config(format!("Failed to parse credentials file: {}", e)))?;
    if credentials.api_key.is_empty() {
        return Err(MemoriaError::Config("Credentials file has an empty api_key".into()).into());
    }
    Ok(credentials.api_key)
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key for the generative language API
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the generative language API
    #[serde(default = "default_generator_base")]
    pub base_url: String,

    /// Model used for descriptions and answers
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_generator_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generator_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generator_base(),
            model: default_generator_model(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Embedding endpoint configuration (OpenAI-compatible `/embeddings`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL; `/embeddings` is appended
    #[serde(default = "default_embedding_base")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_embedding_base() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base(),
            model: default_embedding_model(),
            api_key: None,
        }
    }
}

/// Memory store location
///
/// The memory store is opt-in: with no path configured it is reported as
/// disconnected and persistence is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite file holding image, item-location, and interaction records
    #[serde(default)]
    pub memory_db: Option<PathBuf>,
}

/// Qdrant vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Qdrant gRPC URL; `None` leaves the vector index unavailable
    #[serde(default)]
    pub url: Option<String>,

    /// Collection holding description embeddings
    #[serde(default = "default_vector_collection")]
    pub collection: String,

    /// Embedding dimension used when creating the collection
    #[serde(default = "default_vector_dimension")]
    pub dimension: u64,
}

fn default_vector_collection() -> String {
    "image_descriptions".to_string()
}

fn default_vector_dimension() -> u64 {
    384
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            collection: default_vector_collection(),
            dimension: default_vector_dimension(),
        }
    }
}

/// Outbound retry policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per collaborator call (no delay between attempts)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Fuzzy matcher constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Number of most recent records scanned per lookup
    #[serde(default = "default_window")]
    pub window: usize,

    /// Labels and objects are only scanned for products while the best score stays below this
    #[serde(default = "default_label_fallback_below")]
    pub label_fallback_below: u32,

    /// Tiers for item names in item-location records
    #[serde(default = "ScoreTiers::item_location")]
    pub item_location: ScoreTiers,

    /// Tiers for labels and objects when locating an item
    #[serde(default = "ScoreTiers::image_sighting")]
    pub image_sighting: ScoreTiers,

    /// Tiers for potential product names
    #[serde(default = "ScoreTiers::product")]
    pub product: ScoreTiers,

    /// Tiers for labels and objects when locating a product
    #[serde(default = "ScoreTiers::product_label")]
    pub product_label: ScoreTiers,
}

fn default_window() -> usize {
    20
}

fn default_label_fallback_below() -> u32 {
    70
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            label_fallback_below: default_label_fallback_below(),
            item_location: ScoreTiers::item_location(),
            image_sighting: ScoreTiers::image_sighting(),
            product: ScoreTiers::product(),
            product_label: ScoreTiers::product_label(),
        }
    }
}

/// Product catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Query the food and book catalogs before falling back to shopping links
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed timeout per catalog call (seconds)
    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u64,

    /// Base URL of the food catalog
    #[serde(default = "default_food_base")]
    pub food_base: String,

    /// Base URL of the book catalog
    #[serde(default = "default_book_base")]
    pub book_base: String,
}

fn default_true() -> bool {
    true
}

fn default_catalog_timeout() -> u64 {
    3
}

fn default_food_base() -> String {
    "https://world.openfoodfacts.org".to_string()
}

fn default_book_base() -> String {
    "https://openlibrary.org".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            timeout_seconds: default_catalog_timeout(),
            food_base: default_food_base(),
            book_base: default_book_base(),
        }
    }
}

/// Audio handling for voice uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// External converter producing mono 16 kHz WAV; `None` disables conversion
    #[serde(default = "default_converter")]
    pub converter: Option<String>,

    /// Sample rate reported to speech recognition
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hertz: u32,

    /// Recognition and synthesis language
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

fn default_converter() -> Option<String> {
    Some("ffmpeg".to_string())
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_language_code() -> String {
    "en-US".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
            sample_rate_hertz: default_sample_rate(),
            language_code: default_language_code(),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MemoriaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MemoriaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid PORT: {}", port);
            }
        }

        if let Ok(required) = std::env::var("API_KEY_REQUIRED") {
            self.auth.api_key_required = required.eq_ignore_ascii_case("true");
        }

        if let Ok(api_key) = std::env::var("API_KEY") {
            self.auth.api_key = api_key;
        }

        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.google.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.google.credentials_file = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.generator.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("MEMORIA_MEMORY_DB") {
            self.storage.memory_db = Some(PathBuf::from(path));
        }

        if let Ok(url) = std::env::var("MEMORIA_VECTOR_URL") {
            self.vector.url = Some(url);
        }

        if let Ok(url) = std::env::var("MEMORIA_EMBEDDING_URL") {
            self.embedding.base_url = url;
        }

        if let Ok(model) = std::env::var("MEMORIA_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Ok(converter) = std::env::var("MEMORIA_AUDIO_CONVERTER") {
            self.audio.converter = match converter.trim() {
                "" | "none" => None,
                other => Some(other.to_string()),
            };
        }

        if let Ok(json_logs) = std::env::var("MEMORIA_JSON_LOGS") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json = v,
                Err(_) => tracing::warn!("Invalid value for MEMORIA_JSON_LOGS: {}", json_logs),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if cli.json_logs {
            self.logging.json = true;
        }

        match &cli.command {
            crate::cli::Commands::Assistant { host, port } => {
                if let Some(host) = host {
                    self.server.host = host.clone();
                }
                if let Some(port) = port {
                    self.server.port = *port;
                }
            }
            crate::cli::Commands::Retrieval { host, port } => {
                if let Some(host) = host {
                    self.server.host = host.clone();
                }
                if let Some(port) = port {
                    self.server.retrieval_port = *port;
                }
            }
            crate::cli::Commands::Route { .. } => {}
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 || self.server.retrieval_port == 0 {
            return Err(MemoriaError::Config("server ports must be greater than 0".to_string()).into());
        }

        if self.server.max_upload_bytes == 0 {
            return Err(MemoriaError::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.auth.api_key_required && self.auth.api_key.is_empty() {
            return Err(MemoriaError::Config(
                "auth.api_key cannot be empty when api_key_required is set".to_string(),
            )
            .into());
        }

        if self.retry.max_attempts == 0 {
            return Err(
                MemoriaError::Config("retry.max_attempts must be greater than 0".to_string()).into(),
            );
        }

        if self.retry.max_attempts > 10 {
            return Err(MemoriaError::Config(
                "retry.max_attempts must be less than or equal to 10".to_string(),
            )
            .into());
        }

        if self.matcher.window == 0 {
            return Err(
                MemoriaError::Config("matcher.window must be greater than 0".to_string()).into(),
            );
        }

        if self.vector.dimension == 0 {
            return Err(
                MemoriaError::Config("vector.dimension must be greater than 0".to_string()).into(),
            );
        }

        if self.catalog.timeout_seconds == 0 {
            return Err(MemoriaError::Config(
                "catalog.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_error_contains;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.matcher.window, 20);
        assert!(!config.auth.api_key_required);
        assert_eq!(config.auth.api_key, "development-key");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_attempts_too_large() {
        let mut config = Config::default();
        config.retry.max_attempts = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_window() {
        let mut config = Config::default();
        config.matcher.window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_required_key_must_be_set() {
        let mut config = Config::default();
        config.auth.api_key_required = true;
        config.auth.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_vector_dimension() {
        let mut config = Config::default();
        config.vector.dimension = 0;
        assert_error_contains(config.validate(), "vector.dimension");
    }

    #[test]
    fn test_stores_are_opt_in_by_default() {
        let config = Config::default();
        assert!(config.storage.memory_db.is_none());
        assert!(config.vector.url.is_none());
        assert_eq!(config.vector.collection, "image_descriptions");
        assert_eq!(config.vector.dimension, 384);
    }

    #[test]
    fn test_matcher_defaults_match_tier_tables() {
        let matcher = MatcherConfig::default();
        assert_eq!(matcher.item_location.exact, 100);
        assert_eq!(matcher.item_location.term_in_candidate, 75);
        assert_eq!(matcher.image_sighting.exact, 90);
        assert_eq!(matcher.product.term_in_candidate, 80);
        assert_eq!(matcher.product_label.candidate_in_term, 60);
        assert_eq!(matcher.label_fallback_below, 70);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 9090
auth:
  api_key_required: true
  api_key: secret
retry:
  max_attempts: 5
matcher:
  window: 10
  product:
    exact: 99
    term_in_candidate: 80
    candidate_in_term: 70
    word_overlap: 50
vector:
  url: http://qdrant:6334
  dimension: 768
catalog:
  enabled: false
audio:
  converter: null
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.retrieval_port, 5000);
        assert!(config.auth.api_key_required);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.matcher.window, 10);
        assert_eq!(config.matcher.product.exact, 99);
        assert_eq!(config.matcher.item_location.exact, 100);
        assert_eq!(config.vector.url.as_deref(), Some("http://qdrant:6334"));
        assert_eq!(config.vector.dimension, 768);
        assert_eq!(config.vector.collection, "image_descriptions");
        assert!(!config.catalog.enabled);
        assert!(config.audio.converter.is_none());
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/memoria.yaml", &cli).unwrap();
        assert_eq!(config.matcher.window, 20);
    }

    #[test]
    fn test_cli_overrides_retrieval_listener() {
        use clap::Parser;
        let cli = crate::cli::Cli::try_parse_from([
            "memoria",
            "--json-logs",
            "retrieval",
            "--host",
            "127.0.0.1",
            "--port",
            "5050",
        ])
        .unwrap();

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.retrieval_port, 5050);
        assert_eq!(config.server.port, 8080);
        assert!(config.logging.json);
    }

    #[test]
    fn test_resolve_api_key_prefers_inline_value() {
        let config = GoogleConfig {
            api_key: Some("inline".to_string()),
            credentials_file: Some(PathBuf::from("/nonexistent.json")),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("inline"));
    }

    #[test]
    fn test_resolve_api_key_reads_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"api_key": "from-file"}"#).unwrap();

        let config = GoogleConfig {
            credentials_file: Some(path),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_resolve_api_key_missing_file_degrades() {
        let config = GoogleConfig {
            credentials_file: Some(PathBuf::from("/nonexistent/credentials.json")),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_auth_and_port() {
        std::env::set_var("PORT", "9191");
        std::env::set_var("API_KEY_REQUIRED", "True");
        std::env::set_var("API_KEY", "env-key");
        std::env::set_var("MEMORIA_AUDIO_CONVERTER", "none");
        std::env::set_var("MEMORIA_VECTOR_URL", "http://qdrant:6334");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.server.port, 9191);
        assert!(config.auth.api_key_required);
        assert_eq!(config.auth.api_key, "env-key");
        assert!(config.audio.converter.is_none());
        assert_eq!(config.vector.url.as_deref(), Some("http://qdrant:6334"));

        std::env::remove_var("PORT");
        std::env::remove_var("API_KEY_REQUIRED");
        std::env::remove_var("API_KEY");
        std::env::remove_var("MEMORIA_AUDIO_CONVERTER");
        std::env::remove_var("MEMORIA_VECTOR_URL");
    }
}
