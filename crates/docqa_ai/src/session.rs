//! One user's document QA session: ingestion, the cached index, the answer
//! chain and the conversation.
//!
//! Lock order is index, then chain, then conversation. Ingestion holds the
//! index lock exclusively; questions share it.

use std::path::PathBuf;
use std::sync::Arc;

use docqa_core::chunking::TextChunker;
use docqa_core::config::DocQaConfig;
use docqa_core::domain::{IngestSummary, QueryResponse, QueryResult};
use docqa_core::error::{codes, AppError};
use docqa_core::ingest::{load_files, write_combined_text};
use docqa_core::memory::{Conversation, ConversationTurn};
use docqa_core::normalize::now_rfc3339_utc;
use docqa_core::workspace::{stage_uploads, UploadedFile};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::answer::AnswerChain;
use crate::embeddings::Embedder;
use crate::index::{IndexCache, IndexManifest, VectorIndex};
use crate::llm::Llm;
use crate::providers::build_providers;

pub const HISTORY_COMMAND: &str = "history";
pub const CLEAR_COMMAND: &str = "clear";
pub const CLEARED_MESSAGE: &str = "Conversation history cleared.";

pub struct Session {
    config: DocQaConfig,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    chunker: TextChunker,
    index_lock: RwLock<()>,
    index_cache: IndexCache,
    chain: Mutex<AnswerChain>,
    conversation: Mutex<Conversation>,
}

impl Session {
    pub fn new(config: DocQaConfig, embedder: Arc<dyn Embedder>, llm: Arc<dyn Llm>) -> Result<Self, AppError> {
        config.validate()?;
        let chunker = TextChunker::from_config(&config.chunking)?;
        Ok(Self {
            index_cache: IndexCache::new(config.storage.index_dir.clone()),
            chain: Mutex::new(AnswerChain::new(config.retrieval.top_k)),
            conversation: Mutex::new(Conversation::new(config.memory.preview_chars)),
            index_lock: RwLock::new(()),
            chunker,
            embedder,
            llm,
            config,
        })
    }

    /// Build the configured providers and open a session over them.
    pub fn from_config(config: DocQaConfig) -> Result<Self, AppError> {
        let providers = build_providers(&config.provider)?;
        Self::new(config, providers.embedder, providers.llm)
    }

    pub fn config(&self) -> &DocQaConfig {
        &self.config
    }

    pub fn index_cache(&self) -> &IndexCache {
        &self.index_cache
    }

    /// Stage uploaded files under the uploads directory, then ingest them.
    pub fn ingest_uploads(&self, files: &[UploadedFile]) -> Result<IngestSummary, AppError> {
        let _guard = self.index_lock.write();
        let paths = stage_uploads(&self.config.uploads_dir(), files)?;
        self.ingest_locked(&paths)
    }

    /// Load, chunk, embed and persist `paths`, replacing the current index.
    pub fn ingest_paths(&self, paths: &[PathBuf]) -> Result<IngestSummary, AppError> {
        let _guard = self.index_lock.write();
        self.ingest_locked(paths)
    }

    fn ingest_locked(&self, paths: &[PathBuf]) -> Result<IngestSummary, AppError> {
        if paths.is_empty() {
            return Err(AppError::new(codes::EMPTY_INPUT, "No files provided for ingestion"));
        }

        let docs = load_files(paths)?;
        let chunks = self.chunker.chunk_documents(&docs);
        info!(files = docs.len(), chunks = chunks.len(), "documents chunked");

        let built_at = now_rfc3339_utc()?;
        let index = VectorIndex::build(
            chunks,
            self.embedder.as_ref(),
            self.config.retrieval.embed_batch_size,
            &built_at,
        )?;
        index.save(&self.config.storage.index_dir)?;
        write_combined_text(&docs, &self.config.combined_text_path())?;

        let index = Arc::new(index);
        self.index_cache.store(Arc::clone(&index));
        *self.chain.lock() = AnswerChain::for_index(Arc::clone(&index), self.config.retrieval.top_k);

        let files_ingested = docs.len() as u32;
        Ok(IngestSummary {
            message: format!("{files_ingested} files ingested and index created."),
            files_ingested,
            chunks_indexed: index.manifest().chunk_count,
            index_etag: index.etag().to_string(),
        })
    }

    /// Make sure the persisted index is loaded and the chain points at it.
    pub fn load_index(&self) -> Result<IndexManifest, AppError> {
        let _guard = self.index_lock.read();
        let chain = self.current_chain()?;
        chain
            .index_manifest()
            .ok_or_else(|| AppError::new(codes::CHAIN_NOT_READY, "Answer chain has no index attached"))
    }

    fn current_chain(&self) -> Result<AnswerChain, AppError> {
        let index = self.index_cache.get()?;
        let mut chain = self.chain.lock();
        if chain.index_etag() != Some(index.etag()) {
            debug!(etag = %index.etag(), "rebuilding answer chain");
            *chain = AnswerChain::for_index(index, self.config.retrieval.top_k);
        }
        Ok(chain.clone())
    }

    /// Answer one question against the current index, recording the exchange.
    pub fn ask(&self, question: &str) -> Result<QueryResult, AppError> {
        let _guard = self.index_lock.read();
        let chain = self.current_chain()?;
        let mut conversation = self.conversation.lock();
        chain.answer(self.embedder.as_ref(), self.llm.as_ref(), question, &mut conversation)
    }

    /// Query boundary: reserved commands, then questions. Never fails.
    pub fn query(&self, input: &str) -> QueryResponse {
        let command = input.trim();
        if command.eq_ignore_ascii_case(HISTORY_COMMAND) {
            return QueryResponse::answer(self.history());
        }
        if command.eq_ignore_ascii_case(CLEAR_COMMAND) {
            self.clear_history();
            return QueryResponse::answer(CLEARED_MESSAGE);
        }

        match self.ask(input) {
            Ok(result) => QueryResponse::from_result(result),
            Err(e) => {
                warn!(
                    code = %e.code,
                    error = %e.message,
                    details = e.details.as_deref().unwrap_or(""),
                    "query failed"
                );
                QueryResponse::from_error(&e)
            }
        }
    }

    pub fn history(&self) -> String {
        self.conversation.lock().summarize()
    }

    pub fn clear_history(&self) {
        self.conversation.lock().clear();
        info!("conversation cleared");
    }

    pub fn conversation_turns(&self) -> Vec<ConversationTurn> {
        self.conversation.lock().all().to_vec()
    }
}
