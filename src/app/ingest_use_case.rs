use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::app::ports::PageSourcePort;
use crate::pipeline::ingestion::{fetch_all, ListingExtractor, UrlDiscovery};
use crate::types::RawListing;

/// Use case for turning event page URLs into raw listings
pub struct IngestUseCase {
    source: Arc<dyn PageSourcePort>,
    extractor: ListingExtractor,
    concurrency: usize,
}

impl IngestUseCase {
    pub fn new(source: Arc<dyn PageSourcePort>, concurrency: usize) -> Result<Self> {
        Ok(Self {
            source,
            extractor: ListingExtractor::new()?,
            concurrency,
        })
    }

    /// Crawl the area index at `area_url` for event page URLs.
    pub async fn discover(&self, area_url: &str) -> Result<Vec<String>> {
        let discovery = UrlDiscovery::new(area_url)?;
        Ok(discovery.discover(Arc::clone(&self.source), self.concurrency).await?)
    }

    /// Fetch every page, then extract one listing per fetched page in URL order.
    pub async fn ingest(&self, urls: Vec<String>) -> Result<Vec<RawListing>> {
        let requested = urls.len();
        let pages = fetch_all(Arc::clone(&self.source), urls, self.concurrency).await;
        let listings: Vec<RawListing> = pages
            .iter()
            .map(|page| self.extractor.extract(&page.url, &page.body))
            .collect();
        info!(requested, extracted = listings.len(), "Ingest complete");
        Ok(listings)
    }
}
