//! Pipeline orchestrator for Clipchat.
//!
//! Coordinates ingestion (transcript to index, summary and readiness record) and gates
//! answering on a video being ready.

use crate::config::{Prompts, Settings, StoreProvider, TranscriptProviderKind};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{ClipchatError, Result};
use crate::indexing::ChunkUploader;
use crate::llm::{LanguageModel, OpenAIChatModel};
use crate::rag::{Answer, QueryAnswerer, Retriever};
use crate::summary::Summarizer;
use crate::transcript::{
    extract_video_id, normalize, render_full_transcript, FileTranscriptProvider, Segment,
    TranscriptProvider, YoutubeTranscriptProvider,
};
use crate::vector_store::{
    collection_name, staging_name, MemoryVectorIndex, SqliteVectorIndex, VectorIndex,
};
use crate::video_store::{
    MemoryVideoStore, SqliteVideoStore, VideoRecord, VideoStatus, VideoStore,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The collaborators an orchestrator drives.
#[derive(Clone)]
pub struct Components {
    pub transcripts: Arc<dyn TranscriptProvider>,
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub model: Arc<dyn LanguageModel>,
    pub videos: Arc<dyn VideoStore>,
}

/// The main orchestrator for the Clipchat pipeline.
pub struct Orchestrator {
    settings: Settings,
    components: Components,
    summarizer: Summarizer,
    answerer: QueryAnswerer,
}

impl Orchestrator {
    /// Create an orchestrator with adapters chosen by the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcripts: Arc<dyn TranscriptProvider> = match settings.transcript.provider {
            TranscriptProviderKind::Youtube => Arc::new(YoutubeTranscriptProvider::new(
                settings.transcript.languages.clone(),
                settings.temp_dir(),
            )),
            TranscriptProviderKind::File => {
                Arc::new(FileTranscriptProvider::new(settings.transcript_dir()))
            }
        };

        if settings.embedding.provider != "openai" {
            return Err(ClipchatError::Config(format!(
                "Unknown embedding provider: {}",
                settings.embedding.provider
            )));
        }
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        let index: Arc<dyn VectorIndex> = match settings.vector_store.provider {
            StoreProvider::Sqlite => Arc::new(SqliteVectorIndex::new(&settings.vector_store_path())?),
            StoreProvider::Memory => Arc::new(MemoryVectorIndex::new()),
        };

        let videos: Arc<dyn VideoStore> = match settings.video_store.provider {
            StoreProvider::Sqlite => Arc::new(SqliteVideoStore::new(&settings.video_store_path())?),
            StoreProvider::Memory => Arc::new(MemoryVideoStore::new()),
        };

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAIChatModel::new(
            &settings.llm.model,
            settings.llm.temperature,
        )?);

        info!(
            "Using {} transcripts, {} index, {} video store",
            settings.transcript.provider, settings.vector_store.provider, settings.video_store.provider
        );

        Ok(Self::with_components(
            settings,
            prompts,
            Components {
                transcripts,
                embedder,
                index,
                model,
                videos,
            },
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, prompts: Prompts, components: Components) -> Self {
        let summarizer = Summarizer::new(components.model.clone(), prompts.summary_system());
        let answerer = QueryAnswerer::new(
            Retriever::new(components.index.clone(), components.embedder.clone()),
            components.model.clone(),
        )
        .with_prompts(prompts)
        .with_top_k(settings.rag.top_k);

        Self {
            settings,
            components,
            summarizer,
            answerer,
        }
    }

    /// Ingest a video: fetch and normalize its transcript, rebuild its index, summarize
    /// it and mark it ready.
    ///
    /// Every error leaves the video store and the live index as they were before the call.
    #[instrument(skip(self), fields(input = %url))]
    pub async fn ingest(&self, url: &str) -> Result<IngestResult> {
        let video_id = extract_video_id(url).ok_or_else(|| {
            ClipchatError::InvalidVideoReference(format!("Could not find a video ID in: {}", url))
        })?;

        info!("Fetching transcript for {}", video_id);
        let entries = self.components.transcripts.fetch(&video_id).await?;
        let segments = normalize(&video_id, &entries)?;

        let marked = self
            .components
            .videos
            .compare_and_set(&video_id, None, VideoRecord::pending(&video_id))
            .await?;
        debug!("Pending marker written: {}", marked);

        match self.index_and_publish(&video_id, &segments).await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.roll_back(&video_id, marked).await;
                Err(e)
            }
        }
    }

    /// Build the new index beside the live one, then swap it in and record the video as ready.
    async fn index_and_publish(&self, video_id: &str, segments: &[Segment]) -> Result<IngestResult> {
        let collection = collection_name(video_id);
        let staging = staging_name(&collection);
        self.components.index.clear(&staging).await?;

        let report = ChunkUploader::new(
            self.components.embedder.as_ref(),
            self.components.index.as_ref(),
        )
        .with_batch_size(self.settings.embedding.batch_size)
        .upload(&staging, segments)
        .await?;

        let summary = self.summarizer.summarize(video_id, segments).await;

        self.components.index.promote(&staging, &collection).await?;
        self.components
            .videos
            .put(VideoRecord::ready(
                video_id,
                summary.clone(),
                render_full_transcript(segments),
                report.indexed,
            ))
            .await?;

        info!("Video {} is ready ({} segments)", video_id, report.indexed);

        Ok(IngestResult {
            video_id: video_id.to_string(),
            summary,
            segments_indexed: report.indexed,
            segments_rejected: report.rejected,
        })
    }

    /// Drop the half-built index and the pending marker this call wrote.
    async fn roll_back(&self, video_id: &str, marked: bool) {
        let staging = staging_name(&collection_name(video_id));
        if let Err(e) = self.components.index.clear(&staging).await {
            warn!("Failed to discard staged segments for {}: {}", video_id, e);
        }

        if marked {
            if let Err(e) = self.components.videos.remove(video_id).await {
                warn!("Failed to remove pending marker for {}: {}", video_id, e);
            }
        }
    }

    /// Answer a question about an ingested video.
    ///
    /// Fails with [`ClipchatError::VideoNotProcessed`] unless the video is ready.
    #[instrument(skip(self, question))]
    pub async fn answer(&self, video_id: &str, question: &str) -> Result<Answer> {
        let record = match self.components.videos.get(video_id).await? {
            Some(record) if record.status == VideoStatus::Ready => record,
            _ => return Err(ClipchatError::VideoNotProcessed(video_id.to_string())),
        };

        self.answerer.answer(&record, question).await
    }

    /// All known videos, most recently updated first.
    pub async fn videos(&self) -> Result<Vec<VideoRecord>> {
        self.components.videos.list().await
    }

    /// The record of one video, if any.
    pub async fn video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        self.components.videos.get(video_id).await
    }
}

/// Result of ingesting a video.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Video ID.
    pub video_id: String,
    /// Prose summary (may be a fallback message).
    pub summary: String,
    /// Segments stored in the index.
    pub segments_indexed: usize,
    /// Segments dropped because of invalid embeddings.
    pub segments_rejected: usize,
}
