//! Sequential ingestion pipeline.
//!
//! One record at a time: optional title, embedding, insert. Batches only
//! bound progress-reporting granularity; they carry no transactional
//! meaning. The first failure halts the run and is returned with the
//! 1-based record number; everything inserted before it stays committed.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vectorlab_types::conversation::SourceRecord;
use vectorlab_types::error::{IngestError, SourceError};
use vectorlab_types::ingest::{IngestPhase, IngestProgress};

use crate::embedding::{BoxTitleSummarizer, Embedder, TitleSummarizer};
use crate::store::{ConversationStore, SchemaManager};

/// Records per progress batch when the caller does not choose.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Drives one ingestion run against a schema manager, store and embedder.
pub struct IngestPipeline<'a, S, C, E> {
    schema: &'a S,
    store: &'a C,
    embedder: &'a E,
    titles: Option<&'a BoxTitleSummarizer>,
    cancel: CancellationToken,
}

impl<'a, S, C, E> IngestPipeline<'a, S, C, E>
where
    S: SchemaManager,
    C: ConversationStore,
    E: Embedder,
{
    pub fn new(schema: &'a S, store: &'a C, embedder: &'a E) -> Self {
        Self {
            schema,
            store,
            embedder,
            titles: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Generate titles for records that arrive without one.
    pub fn with_titles(mut self, titles: Option<&'a BoxTitleSummarizer>) -> Self {
        self.titles = titles;
        self
    }

    /// Token checked between records; cancelling it ends the run with
    /// [`IngestError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Ingest every record from `source` and return how many were inserted.
    ///
    /// `on_progress` sees every phase change, including the terminal one.
    #[tracing::instrument(name = "ingest", skip_all, fields(batch_size = batch_size))]
    pub async fn ingest<I>(
        &self,
        source: I,
        batch_size: usize,
        on_progress: impl FnMut(IngestProgress) + Send,
    ) -> Result<usize, IngestError>
    where
        I: IntoIterator<Item = Result<SourceRecord, SourceError>>,
        I::IntoIter: Send,
    {
        let mut tracker = Tracker::new(on_progress);

        match self.run(source.into_iter(), batch_size, &mut tracker).await {
            Ok(count) => {
                tracker.emit(IngestPhase::Completed);
                info!(inserted = count, "ingestion completed");
                Ok(count)
            }
            Err(err) => {
                let phase = match err {
                    IngestError::Cancelled { .. } => IngestPhase::Cancelled,
                    _ => IngestPhase::Failed,
                };
                tracker.emit(phase);
                warn!(inserted = tracker.inserted, error = %err, "ingestion halted");
                Err(err)
            }
        }
    }

    async fn run<F>(
        &self,
        source: impl Iterator<Item = Result<SourceRecord, SourceError>> + Send,
        batch_size: usize,
        tracker: &mut Tracker<F>,
    ) -> Result<usize, IngestError>
    where
        F: FnMut(IngestProgress) + Send,
    {
        if batch_size == 0 {
            return Err(IngestError::InvalidBatchSize);
        }

        tracker.emit(IngestPhase::Opened);
        self.schema
            .ensure_schema()
            .await
            .map_err(IngestError::Schema)?;

        let mut batch: Vec<SourceRecord> = Vec::with_capacity(batch_size);
        let mut read = 0usize;

        tracker.emit(IngestPhase::Reading);
        for item in source {
            read += 1;
            let record = item.map_err(|source| IngestError::Source {
                record: read,
                source,
            })?;
            batch.push(record);

            if batch.len() >= batch_size {
                self.process_batch(&mut batch, tracker).await?;
                tracker.emit(IngestPhase::Reading);
            }
        }

        if !batch.is_empty() {
            self.process_batch(&mut batch, tracker).await?;
        }

        Ok(tracker.inserted)
    }

    async fn process_batch<F>(
        &self,
        batch: &mut Vec<SourceRecord>,
        tracker: &mut Tracker<F>,
    ) -> Result<(), IngestError>
    where
        F: FnMut(IngestProgress) + Send,
    {
        tracker.batch += 1;
        debug!(batch = tracker.batch, size = batch.len(), "processing batch");

        for record in batch.drain(..) {
            if self.cancel.is_cancelled() {
                return Err(IngestError::Cancelled {
                    inserted: tracker.inserted,
                });
            }
            tracker.record = tracker.inserted + 1;
            self.process_record(record, tracker).await?;
        }
        Ok(())
    }

    async fn process_record<F>(
        &self,
        record: SourceRecord,
        tracker: &mut Tracker<F>,
    ) -> Result<(), IngestError>
    where
        F: FnMut(IngestProgress) + Send,
    {
        let number = tracker.record;

        let supplied = record.title.filter(|t| !t.trim().is_empty());
        let title = match (supplied, self.titles) {
            (Some(title), _) => Some(title),
            (None, Some(titles)) => {
                tracker.emit(IngestPhase::Titling);
                match titles.summarize_title(&record.content).await {
                    Ok(title) => Some(title),
                    Err(err) => {
                        warn!(record = number, error = %err, "title generation failed, storing without title");
                        None
                    }
                }
            }
            (None, None) => None,
        };

        tracker.emit(IngestPhase::Embedding);
        let embedding = self
            .embedder
            .embed(&record.content)
            .await
            .map_err(|source| IngestError::Embedding {
                record: number,
                source,
            })?;

        tracker.emit(IngestPhase::Inserting);
        let id = self
            .store
            .insert(
                &record.username,
                &record.content,
                &embedding,
                title.as_deref(),
            )
            .await
            .map_err(|source| IngestError::Insert {
                record: number,
                source,
            })?;

        tracker.inserted += 1;
        debug!(record = number, id, "inserted conversation");
        Ok(())
    }
}

/// Progress counters plus the caller's observer.
struct Tracker<F> {
    on_progress: F,
    record: usize,
    inserted: usize,
    batch: usize,
}

impl<F: FnMut(IngestProgress)> Tracker<F> {
    fn new(on_progress: F) -> Self {
        Self {
            on_progress,
            record: 0,
            inserted: 0,
            batch: 0,
        }
    }

    fn emit(&mut self, phase: IngestPhase) {
        (self.on_progress)(IngestProgress {
            phase,
            record: self.record,
            inserted: self.inserted,
            batch: self.batch,
        });
    }
}
