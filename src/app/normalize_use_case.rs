use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::app::ports::RecordSinkPort;
use crate::pipeline::{BatchResult, ListingPipeline};
use crate::types::{ClassifiedRecord, RawListing};

/// Use case for normalizing a raw batch and handing the results to a sink
pub struct NormalizeUseCase {
    pipeline: Arc<ListingPipeline>,
    output: Box<dyn RecordSinkPort>,
    /// `None` runs on the current task; `Some(0)` uses one worker per core
    workers: Option<usize>,
}

impl NormalizeUseCase {
    pub fn new(pipeline: Arc<ListingPipeline>, output: Box<dyn RecordSinkPort>) -> Self {
        Self {
            pipeline,
            output,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Normalize a batch, write every record and quarantined listing, then flush.
    pub async fn normalize_batch(&self, listings: Vec<RawListing>) -> Result<BatchResult> {
        let result = match self.workers {
            Some(workers) => Arc::clone(&self.pipeline).run_batch_parallel(listings, workers).await?,
            None => self.pipeline.run_batch(&listings),
        };

        for concert in &result.records.concerts {
            self.output
                .write_record(&ClassifiedRecord::Concert(concert.clone()))
                .await?;
        }
        for festival in &result.records.festivals {
            self.output
                .write_record(&ClassifiedRecord::Festival(festival.clone()))
                .await?;
        }
        for listing in &result.quarantined {
            self.output.write_quarantined(listing).await?;
        }
        self.output.flush().await?;

        info!(run_id = %result.run_id, "Batch written to sink");
        Ok(result)
    }
}
