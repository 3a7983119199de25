use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::PageSourcePort;
use crate::observability::metrics;

/// A fetched page body with the URL it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// Fetches every URL with at most `concurrency` requests in flight.
///
/// Failed URLs are logged and skipped. Successful pages come back in input order.
#[instrument(skip(source, urls), fields(total = urls.len()))]
pub async fn fetch_all(source: Arc<dyn PageSourcePort>, urls: Vec<String>, concurrency: usize) -> Vec<FetchedPage> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            match source.fetch_page(&url).await {
                Ok(body) => {
                    debug!(url = %url, bytes = body.len(), "Fetched page");
                    metrics::fetch::page_fetched();
                    Some((index, FetchedPage { url, body }))
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping page that failed to fetch");
                    metrics::fetch::page_failed();
                    None
                }
            }
        });
    }

    let mut slots: Vec<Option<FetchedPage>> = vec![None; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some((index, page))) => slots[index] = Some(page),
            Ok(None) => {}
            Err(e) => warn!("Fetch task failed: {}", e),
        }
    }

    let pages: Vec<FetchedPage> = slots.into_iter().flatten().collect();
    info!(fetched = pages.len(), failed = urls.len() - pages.len(), "Fetch complete");
    pages
}
