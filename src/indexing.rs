//! Batched embedding upload with per-item validation.
//!
//! Segments are embedded one batch at a time. Every returned vector is checked against
//! the embedder's declared dimensionality; bad vectors drop only their own segment.

use crate::embedding::Embedder;
use crate::error::{ClipchatError, Result};
use crate::transcript::Segment;
use crate::vector_store::{IndexedSegment, VectorIndex};
use tracing::{debug, info, instrument, warn};

/// Default number of segments per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Outcome of validating one (segment, embedding) pair.
#[derive(Debug)]
pub enum Validated {
    Accepted(IndexedSegment),
    Rejected { segment: Segment, reason: ClipchatError },
}

/// Check one embedding against the expected length.
pub fn validate(segment: Segment, embedding: Option<Vec<f32>>, dimensions: usize) -> Validated {
    match embedding {
        Some(vector) if vector.len() == dimensions => {
            Validated::Accepted(IndexedSegment::new(segment, vector))
        }
        Some(vector) => Validated::Rejected {
            segment,
            reason: ClipchatError::EmbeddingValidation(format!(
                "expected {} dimensions, got {}",
                dimensions,
                vector.len()
            )),
        },
        None => Validated::Rejected {
            segment,
            reason: ClipchatError::EmbeddingValidation("no embedding returned".to_string()),
        },
    }
}

/// Accepted pairs and rejection count for one batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<IndexedSegment>,
    pub rejected: usize,
}

impl BatchOutcome {
    fn fold(results: impl IntoIterator<Item = Validated>) -> Self {
        results
            .into_iter()
            .fold(BatchOutcome::default(), |mut outcome, result| {
                match result {
                    Validated::Accepted(item) => outcome.accepted.push(item),
                    Validated::Rejected { segment, reason } => {
                        debug!("Rejected segment at {}: {}", segment.timestamp, reason);
                        outcome.rejected += 1;
                    }
                }
                outcome
            })
    }
}

/// Totals for a whole upload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    /// Segments stored in the index.
    pub indexed: usize,
    /// Segments dropped because of an invalid embedding.
    pub rejected: usize,
    /// Batches processed.
    pub batches: usize,
    /// Batches with no valid pair, for which no upsert was issued.
    pub skipped_batches: usize,
}

/// Uploads segments into a collection in fixed-size batches.
pub struct ChunkUploader<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
    batch_size: usize,
}

impl<'a> ChunkUploader<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self {
            embedder,
            index,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed and upsert all segments, strictly one batch after another.
    ///
    /// Only a failing embedding or upsert call aborts the upload.
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn upload(&self, collection: &str, segments: &[Segment]) -> Result<UploadReport> {
        let dimensions = self.embedder.dimensions();
        let mut report = UploadReport::default();

        for (batch_number, batch) in segments.chunks(self.batch_size).enumerate() {
            report.batches += 1;

            let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
            let mut embeddings = self.embedder.embed_batch(&texts).await?.into_iter();

            let outcome = BatchOutcome::fold(
                batch
                    .iter()
                    .map(|segment| validate(segment.clone(), embeddings.next(), dimensions)),
            );

            if outcome.rejected > 0 {
                warn!(
                    "Skipped {} segments with invalid embeddings in batch {}",
                    outcome.rejected, batch_number
                );
            }
            report.rejected += outcome.rejected;

            if outcome.accepted.is_empty() {
                report.skipped_batches += 1;
                continue;
            }

            report.indexed += self.index.upsert(collection, &outcome.accepted).await?;
        }

        info!(
            "Indexed {} segments into {} ({} rejected, {} batches)",
            report.indexed, collection, report.rejected, report.batches
        );

        Ok(report)
    }
}
