//! Pipeline orchestrator for Vidsage.
//!
//! Builds every capability from [`Settings`] (or takes them injected) and exposes the
//! host-level actions: ingest, search, ask and source management.

use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, VidsageError};
use crate::pipeline::{Document, IngestMode, IngestionPipeline, Match, RetrievalEngine};
use crate::rag::{
    AnswerComposer, ExtractiveComposer, GeneratingComposer, OpenAIGenerator, RagEngine,
    RagResponse,
};
use crate::source::SourceChain;
use crate::vector_store::{create_index, IndexEntry, IndexedSource, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Vidsage pipeline.
pub struct Orchestrator {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    sources: SourceChain,
    composer: Arc<dyn AnswerComposer>,
    extractive: Arc<ExtractiveComposer>,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = create_embedder(&settings)?;
        let index = create_index(&settings)?;
        let sources = SourceChain::from_settings(&settings.sources)?;

        let extractive = Arc::new(extractive_composer(&settings));
        let composer: Arc<dyn AnswerComposer> = if settings.answer.generate {
            info!("Answers generated with {}", settings.answer.model);
            let generator =
                OpenAIGenerator::new(&settings.answer.model)?.with_prompts(prompts);
            Arc::new(GeneratingComposer::new(
                Arc::new(generator),
                extractive_composer(&settings),
            ))
        } else {
            extractive.clone()
        };

        Self::with_components(settings, embedder, index, sources, composer)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        sources: SourceChain,
        composer: Arc<dyn AnswerComposer>,
    ) -> Result<Self> {
        if embedder.dimensions() != index.dimensions() {
            return Err(VidsageError::DimensionMismatch {
                expected: index.dimensions(),
                actual: embedder.dimensions(),
            });
        }
        settings.chunking_config()?;

        Ok(Self {
            extractive: Arc::new(extractive_composer(&settings)),
            settings,
            embedder,
            index,
            sources,
            composer,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the vector index.
    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the transcript source chain.
    pub fn sources(&self) -> &SourceChain {
        &self.sources
    }

    /// Ingestion pipeline using `mode`, or the configured mode when `None`.
    pub fn ingestion_pipeline(&self, mode: Option<IngestMode>) -> Result<IngestionPipeline> {
        Ok(IngestionPipeline::new(
            self.embedder.clone(),
            self.index.clone(),
            self.settings.chunking_config()?,
        )?
        .with_mode(mode.unwrap_or(self.settings.ingest.mode))
        .with_batching(
            self.settings.embedding.batch_size,
            self.settings.embedding.max_concurrent,
        ))
    }

    /// Retrieval engine with `min_score`, or the configured threshold when `None`.
    pub fn retrieval_engine(&self, min_score: Option<f32>) -> Result<RetrievalEngine> {
        Ok(
            RetrievalEngine::new(self.embedder.clone(), self.index.clone())?
                .with_min_score(min_score.or(self.settings.retrieval.min_score)),
        )
    }

    /// RAG engine; `generate = false` forces extractive answers.
    pub fn rag_engine(&self, generate: bool) -> Result<RagEngine> {
        let composer: Arc<dyn AnswerComposer> = if generate {
            self.composer.clone()
        } else {
            self.extractive.clone()
        };
        Ok(RagEngine::new(self.retrieval_engine(None)?, composer))
    }

    /// Fetch a transcript through the source chain and ingest it.
    #[instrument(skip(self), fields(locator = %locator))]
    pub async fn ingest_locator(
        &self,
        locator: &str,
        mode: Option<IngestMode>,
    ) -> Result<IngestResult> {
        let transcript = self.sources.fetch(locator).await?;
        let mut result = self
            .ingest_text(&transcript.source_id, &transcript.text, mode)
            .await?;
        result.title = transcript.title;
        Ok(result)
    }

    /// Ingest already-available transcript text under `source_id`.
    pub async fn ingest_text(
        &self,
        source_id: &str,
        text: &str,
        mode: Option<IngestMode>,
    ) -> Result<IngestResult> {
        let document = Document::new(source_id, text);
        let report = self
            .ingestion_pipeline(mode)?
            .ingest_document(&document)
            .await?;
        Ok(IngestResult {
            source_id: report.source_id,
            title: None,
            chunk_count: report.chunk_count,
            mode: report.mode,
        })
    }

    /// Ranked matches for `query`.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<Match>> {
        self.retrieval_engine(min_score)?
            .retrieve(query, top_k.unwrap_or(self.settings.retrieval.top_k))
            .await
    }

    /// Answer a question from the index.
    pub async fn ask(
        &self,
        question: &str,
        top_k: Option<usize>,
        generate: bool,
    ) -> Result<RagResponse> {
        self.rag_engine(generate)?
            .ask(question, top_k.unwrap_or(self.settings.retrieval.top_k))
            .await
    }

    /// List indexed sources.
    pub async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        self.index.list_sources().await
    }

    /// Every chunk of a source, in order.
    pub async fn get_source(&self, source_id: &str) -> Result<Vec<IndexEntry>> {
        self.index.get_source(source_id).await
    }

    /// Remove every chunk of a source.
    pub async fn remove_source(&self, source_id: &str) -> Result<usize> {
        let removed = self.index.delete_source(source_id).await?;
        info!("Removed {} chunks of {}", removed, source_id);
        Ok(removed)
    }
}

fn extractive_composer(settings: &Settings) -> ExtractiveComposer {
    ExtractiveComposer::new(
        settings.answer.separator.clone(),
        settings.answer.max_context_chars,
    )
}

/// Result of ingesting a source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    /// Source ID.
    pub source_id: String,
    /// Title, when the source provided one.
    pub title: Option<String>,
    /// Number of chunks indexed.
    pub chunk_count: usize,
    /// Mode the source was written with.
    pub mode: IngestMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::rag::NO_INFORMATION_MESSAGE;
    use crate::source::LocalFileSource;
    use crate::vector_store::{MemoryVectorIndex, SimilarityMetric};

    fn orchestrator() -> Orchestrator {
        let mut settings = Settings::default();
        settings.chunking.size = 10;
        settings.chunking.overlap = 2;
        settings.answer.generate = false;

        Orchestrator::with_components(
            settings,
            Arc::new(HashEmbedder::new(64).unwrap()),
            Arc::new(MemoryVectorIndex::new(64, SimilarityMetric::Cosine)),
            SourceChain::new(vec![Box::new(LocalFileSource::new())]),
            Arc::new(ExtractiveComposer::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_settings_drive_construction() {
        let mut settings = Settings::default();
        settings.embedding.provider = "hash".to_string();
        settings.embedding.dimensions = 32;
        settings.index.provider = "memory".to_string();
        settings.answer.generate = false;
        settings.sources.order = vec!["local".to_string()];

        let orchestrator = Orchestrator::new(settings).unwrap();
        assert_eq!(orchestrator.index().dimensions(), 32);
        assert_eq!(orchestrator.embedder().dimensions(), 32);
    }

    #[test]
    fn test_rejects_mismatched_components() {
        let result = Orchestrator::with_components(
            Settings::default(),
            Arc::new(HashEmbedder::new(16).unwrap()),
            Arc::new(MemoryVectorIndex::new(64, SimilarityMetric::Cosine)),
            SourceChain::new(Vec::new()),
            Arc::new(ExtractiveComposer::default()),
        );
        assert!(matches!(result, Err(VidsageError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_ingest_search_ask_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volcanoes.txt");
        std::fs::write(
            &path,
            "magma rises through the crust and collects in a chamber below the volcano \
             when pressure builds the eruption sends ash and lava down the slopes",
        )
        .unwrap();

        let orchestrator = orchestrator();
        let result = orchestrator
            .ingest_locator(path.to_str().unwrap(), None)
            .await
            .unwrap();
        assert_eq!(result.source_id, "local_volcanoes");
        assert_eq!(result.title.as_deref(), Some("volcanoes"));
        assert_eq!(result.mode, IngestMode::Append);
        assert!(result.chunk_count > 0);

        let matches = orchestrator
            .search("ash and lava", Some(1), None)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk.source_id, "local_volcanoes");

        let response = orchestrator.ask("what is magma", None, false).await.unwrap();
        assert!(!response.sources.is_empty());
        assert_ne!(response.answer, NO_INFORMATION_MESSAGE);

        let sources = orchestrator.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chunk_count, result.chunk_count);

        let removed = orchestrator.remove_source("local_volcanoes").await.unwrap();
        assert_eq!(removed, result.chunk_count);
        assert!(orchestrator.get_source("local_volcanoes").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_override() {
        let orchestrator = orchestrator();
        let text = "one two three four five six seven eight nine ten eleven twelve";

        let first = orchestrator.ingest_text("vid", text, None).await.unwrap();
        orchestrator
            .ingest_text("vid", text, Some(IngestMode::Upsert))
            .await
            .unwrap();
        assert_eq!(
            orchestrator.get_source("vid").await.unwrap().len(),
            first.chunk_count
        );
    }
}
