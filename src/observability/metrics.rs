//! Metrics for normalization runs.
//!
//! Recording goes through the `metrics` facade, so every call is a no-op until a recorder
//! is installed with [`init`].

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

/// All metric names emitted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ListingsProcessed,
    ConcertsEmitted,
    FestivalsEmitted,
    ListingsQuarantined,
    NormalizeWarnings,
    BatchSize,
    BatchDuration,
    PagesFetched,
    PagesFailed,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ListingsProcessed => "concerts_listings_processed_total",
            MetricName::ConcertsEmitted => "concerts_concerts_emitted_total",
            MetricName::FestivalsEmitted => "concerts_festivals_emitted_total",
            MetricName::ListingsQuarantined => "concerts_listings_quarantined_total",
            MetricName::NormalizeWarnings => "concerts_normalize_warnings_total",
            MetricName::BatchSize => "concerts_batch_size",
            MetricName::BatchDuration => "concerts_batch_duration_seconds",
            MetricName::PagesFetched => "concerts_pages_fetched_total",
            MetricName::PagesFailed => "concerts_pages_failed_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics recorder installed");
    Ok(())
}

/// Current metrics in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod normalize {
    use super::MetricName;

    pub fn batch_processed(size: usize, duration_secs: f64) {
        ::metrics::counter!(MetricName::ListingsProcessed.as_str()).increment(size as u64);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record(size as f64);
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(duration_secs);
    }

    pub fn records_emitted(concerts: usize, festivals: usize) {
        ::metrics::counter!(MetricName::ConcertsEmitted.as_str()).increment(concerts as u64);
        ::metrics::counter!(MetricName::FestivalsEmitted.as_str()).increment(festivals as u64);
    }

    pub fn listings_quarantined(count: usize) {
        ::metrics::counter!(MetricName::ListingsQuarantined.as_str()).increment(count as u64);
    }

    pub fn warning_logged(kind: &'static str) {
        ::metrics::counter!(MetricName::NormalizeWarnings.as_str(), "warning_type" => kind).increment(1);
    }
}

pub mod fetch {
    use super::MetricName;

    pub fn page_fetched() {
        ::metrics::counter!(MetricName::PagesFetched.as_str()).increment(1);
    }

    pub fn page_failed() {
        ::metrics::counter!(MetricName::PagesFailed.as_str()).increment(1);
    }
}

/// Counts from one run, pushed to a Pushgateway when one is configured
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub listings: usize,
    pub concerts: usize,
    pub festivals: usize,
    pub quarantined: usize,
    pub duration_secs: f64,
}

impl RunSummary {
    fn to_exposition(self) -> String {
        let timestamp_secs = chrono::Utc::now().timestamp() as f64;
        format!(
            "# TYPE concerts_listings_processed_total counter\n\
             concerts_listings_processed_total {}\n\
             # TYPE concerts_concerts_emitted_total counter\n\
             concerts_concerts_emitted_total {}\n\
             # TYPE concerts_festivals_emitted_total counter\n\
             concerts_festivals_emitted_total {}\n\
             # TYPE concerts_listings_quarantined_total counter\n\
             concerts_listings_quarantined_total {}\n\
             # TYPE concerts_batch_duration_seconds gauge\n\
             concerts_batch_duration_seconds {}\n\
             # TYPE concerts_last_run_timestamp_seconds gauge\n\
             concerts_last_run_timestamp_seconds {}\n",
            self.listings, self.concerts, self.festivals, self.quarantined, self.duration_secs, timestamp_secs
        )
    }
}

/// Pushes `summary` to `$CONCERTS_PUSHGATEWAY_URL`; does nothing when it is unset.
pub async fn push_run_summary(summary: RunSummary) {
    let base = match std::env::var("CONCERTS_PUSHGATEWAY_URL") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let push_url = format!("{}/metrics/job/concert_pipeline", base.trim_end_matches('/'));

    let result = reqwest::Client::new()
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(summary.to_exposition())
        .send()
        .await;

    match result {
        Ok(r) if r.status().is_success() => info!("Pushed run summary to Pushgateway"),
        Ok(r) => warn!("Pushgateway responded with status {}", r.status().as_u16()),
        Err(e) => warn!("Failed to push metrics to Pushgateway: {}", e),
    }
}
