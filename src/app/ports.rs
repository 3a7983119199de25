use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ClassifiedRecord, QuarantinedListing};

/// Source of event page bodies.
#[async_trait]
pub trait PageSourcePort: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Destination for normalized records and the quarantine report.
#[async_trait]
pub trait RecordSinkPort: Send + Sync {
    async fn write_record(&self, record: &ClassifiedRecord) -> Result<()>;
    async fn write_quarantined(&self, listing: &QuarantinedListing) -> Result<()>;
    async fn flush(&self) -> Result<()>;
}

#[async_trait]
impl<T: RecordSinkPort + ?Sized> RecordSinkPort for std::sync::Arc<T> {
    async fn write_record(&self, record: &ClassifiedRecord) -> Result<()> {
        (**self).write_record(record).await
    }

    async fn write_quarantined(&self, listing: &QuarantinedListing) -> Result<()> {
        (**self).write_quarantined(listing).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }
}
