//! Configuration for the document QA pipeline.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! `DOCQA_*` environment variables. The result is validated before use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{codes, AppError};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocQaConfig {
    /// On-disk layout
    pub storage: StorageConfig,
    /// Chunking parameters
    pub chunking: ChunkingConfig,
    /// Retrieval parameters
    pub retrieval: RetrievalConfig,
    /// Conversation memory
    pub memory: MemoryConfig,
    /// Embedding + language model provider
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root for staged uploads and the ingestion audit file
    pub data_dir: PathBuf,
    /// Directory holding the persisted vector index
    pub index_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_dir: PathBuf::from("data/index"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of the same source
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages handed to the answer prompt
    pub top_k: usize,
    /// Texts per embedding request during index builds
    pub embed_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            embed_batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Characters shown per turn in the history summary before "..."
    pub preview_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { preview_chars: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local Ollama server (127.0.0.1 only)
    Ollama,
    /// OpenAI-compatible HTTP API
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(ProviderKind::Ollama),
            "openai" | "open_ai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
    /// Environment variable holding the API key (OpenAI only)
    pub api_key_env: String,
    pub connect_timeout_ms: u64,
    pub embed_timeout_ms: u64,
    pub generate_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            base_url: "http://127.0.0.1:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            chat_model: "llama3.2:3b".to_string(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            connect_timeout_ms: 2_000,
            embed_timeout_ms: 30_000,
            generate_timeout_ms: 120_000,
        }
    }
}

impl ProviderConfig {
    /// Defaults matching the hosted OpenAI API.
    pub fn openai() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            ..Self::default()
        }
    }
}

impl DocQaConfig {
    /// Load defaults, overlay `path` when given, overlay the process environment, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut cfg = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID, "Failed to read config file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        Self::from_toml_str(&raw).map_err(|e| e.with_details(format!("path={}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        toml::from_str(raw).map_err(|e| {
            AppError::new(codes::CONFIG_INVALID, "Failed to parse config TOML").with_details(e.to_string())
        })
    }

    /// Overlay `DOCQA_*` variables. `lookup` is injectable so tests need not touch the real env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DOCQA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DOCQA_INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DOCQA_CHUNK_SIZE") {
            self.chunking.chunk_size = parse_env_usize("DOCQA_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("DOCQA_CHUNK_OVERLAP") {
            self.chunking.chunk_overlap = parse_env_usize("DOCQA_CHUNK_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("DOCQA_TOP_K") {
            self.retrieval.top_k = parse_env_usize("DOCQA_TOP_K", &v)?;
        }
        if let Some(v) = lookup("DOCQA_PROVIDER") {
            let kind = ProviderKind::parse(&v).ok_or_else(|| {
                AppError::new(codes::CONFIG_INVALID, "DOCQA_PROVIDER must be ollama or openai")
                    .with_details(format!("value={v}"))
            })?;
            if kind != self.provider.kind {
                // Switching provider kind resets provider defaults; explicit overrides below still apply.
                self.provider = match kind {
                    ProviderKind::Ollama => ProviderConfig::default(),
                    ProviderKind::OpenAi => ProviderConfig::openai(),
                };
            }
        }
        if let Some(v) = lookup("DOCQA_BASE_URL") {
            self.provider.base_url = v;
        }
        if let Some(v) = lookup("DOCQA_EMBEDDING_MODEL") {
            self.provider.embedding_model = v;
        }
        if let Some(v) = lookup("DOCQA_CHAT_MODEL") {
            self.provider.chat_model = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(AppError::new(codes::CONFIG_INVALID, "chunking.chunk_size must be > 0"));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(
                AppError::new(codes::CONFIG_INVALID, "chunking.chunk_overlap must be smaller than chunk_size")
                    .with_details(format!("chunk_size={}; chunk_overlap={}", c.chunk_size, c.chunk_overlap)),
            );
        }
        if self.retrieval.top_k == 0 {
            return Err(AppError::new(codes::CONFIG_INVALID, "retrieval.top_k must be > 0"));
        }
        if self.retrieval.embed_batch_size == 0 {
            return Err(AppError::new(codes::CONFIG_INVALID, "retrieval.embed_batch_size must be > 0"));
        }
        if self.memory.preview_chars == 0 {
            return Err(AppError::new(codes::CONFIG_INVALID, "memory.preview_chars must be > 0"));
        }
        let p = &self.provider;
        if p.embedding_model.trim().is_empty() || p.chat_model.trim().is_empty() {
            return Err(AppError::new(codes::CONFIG_INVALID, "provider model names must not be empty"));
        }
        if p.base_url.trim().is_empty() {
            return Err(AppError::new(codes::CONFIG_INVALID, "provider.base_url must not be empty"));
        }
        Ok(())
    }

    /// Fixed location of the concatenated raw text of the latest ingestion.
    pub fn combined_text_path(&self) -> PathBuf {
        self.storage.data_dir.join("ingested_text").join("combined_ingest.txt")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.storage.data_dir.join("uploads")
    }
}

fn parse_env_usize(key: &str, raw: &str) -> Result<usize, AppError> {
    raw.trim().parse::<usize>().map_err(|e| {
        AppError::new(codes::CONFIG_INVALID, format!("{key} must be a non-negative integer"))
            .with_details(format!("value={raw}; err={e}"))
    })
}
