// Listing pipeline: ingestion (fetch + extract) and per-listing processing

pub mod ingestion;
pub mod processing;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::NormalizeConfig;
use crate::constants;
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{ClassifiedRecord, CleanedFields, NormalizeWarning, QuarantinedListing, RawListing};
use processing::{classify, split_time, DateTimeParser, FieldCleaner, LocationResolver, RoutedRecords, ValueSplitter};

/// What happened to a single listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    Classified {
        record: ClassifiedRecord,
        warnings: Vec<NormalizeWarning>,
    },
    Quarantined {
        listing: QuarantinedListing,
        warnings: Vec<NormalizeWarning>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingWarning {
    pub listing_id: String,
    #[serde(flatten)]
    pub warning: NormalizeWarning,
}

/// Output of one partition of a batch, merged into a [`BatchResult`] in input order.
#[derive(Debug, Default)]
struct BatchPart {
    records: RoutedRecords,
    quarantined: Vec<QuarantinedListing>,
    warnings: Vec<ListingWarning>,
}

impl BatchPart {
    fn absorb(&mut self, listing_id: &str, outcome: ListingOutcome) {
        let warnings = match outcome {
            ListingOutcome::Classified { record, warnings } => {
                self.records.route(record);
                warnings
            }
            ListingOutcome::Quarantined { listing, warnings } => {
                warn!(listing_id = %listing.id, reason = %listing.reason, "Quarantined listing");
                self.quarantined.push(listing);
                warnings
            }
        };
        self.warnings.extend(warnings.into_iter().map(|warning| ListingWarning {
            listing_id: listing_id.to_string(),
            warning,
        }));
    }

    fn extend(&mut self, other: BatchPart) {
        self.records.extend(other.records);
        self.quarantined.extend(other.quarantined);
        self.warnings.extend(other.warnings);
    }
}

/// Result of a complete batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub total_listings: usize,
    pub records: RoutedRecords,
    pub quarantined: Vec<QuarantinedListing>,
    pub warnings: Vec<ListingWarning>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn concert_count(&self) -> usize {
        self.records.concerts.len()
    }

    pub fn festival_count(&self) -> usize {
        self.records.festivals.len()
    }

    pub fn quarantined_count(&self) -> usize {
        self.quarantined.len()
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    pub fn run_summary(&self) -> metrics::RunSummary {
        metrics::RunSummary {
            listings: self.total_listings,
            concerts: self.concert_count(),
            festivals: self.festival_count(),
            quarantined: self.quarantined_count(),
            duration_secs: self.duration_secs(),
        }
    }

    fn from_part(total_listings: usize, part: BatchPart, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_listings,
            records: part.records,
            quarantined: part.quarantined,
            warnings: part.warnings,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn record_metrics(&self, elapsed_secs: f64) {
        metrics::normalize::batch_processed(self.total_listings, elapsed_secs);
        metrics::normalize::records_emitted(self.concert_count(), self.festival_count());
        metrics::normalize::listings_quarantined(self.quarantined_count());
        for listing_warning in &self.warnings {
            metrics::normalize::warning_logged(listing_warning.warning.label());
        }

        if self.total_listings > 0 && self.quarantined_count() == self.total_listings {
            warn!(
                run_id = %self.run_id,
                total = self.total_listings,
                "Every listing in the batch was quarantined; the page format may have changed"
            );
        }
        info!(
            run_id = %self.run_id,
            total = self.total_listings,
            concerts = self.concert_count(),
            festivals = self.festival_count(),
            quarantined = self.quarantined_count(),
            warnings = self.warnings.len(),
            "Batch normalized"
        );
    }
}

/// Turns raw listings into concert and festival records.
///
/// Holds only configuration-derived lookup data, so one instance can be shared across
/// worker threads.
pub struct ListingPipeline {
    performer_cleaner: FieldCleaner,
    date_cleaner: FieldCleaner,
    genre_cleaner: FieldCleaner,
    date_parser: DateTimeParser,
    splitter: ValueSplitter,
    location_resolver: LocationResolver,
}

impl ListingPipeline {
    pub fn new(config: &NormalizeConfig) -> Result<Self> {
        Ok(Self {
            performer_cleaner: FieldCleaner::new(&config.performer_label, constants::PERFORMER_JOIN),
            date_cleaner: FieldCleaner::new(&config.date_label, constants::DATE_JOIN),
            genre_cleaner: FieldCleaner::new(&config.genre_label, constants::GENRE_JOIN),
            date_parser: DateTimeParser::new(config)?,
            splitter: ValueSplitter::new(&config.others_suffix),
            location_resolver: LocationResolver::new(&config.venue_label, &config.country_suffix),
        })
    }

    /// Cleans every cell of a listing. Empty performer, venue and genre cells are reported
    /// as warnings; an empty date surfaces later as a malformed date.
    pub fn clean_fields(&self, raw: &RawListing, warnings: &mut Vec<NormalizeWarning>) -> CleanedFields {
        let performer = self.splitter.performers(&self.performer_cleaner.clean(&raw.performer));
        let (venue, location) = self.location_resolver.resolve_location(&raw.venue);
        let genre = self.splitter.genres(&self.genre_cleaner.clean(&raw.genre));
        let (date_text, time_text) = split_time(&self.date_cleaner.clean(&raw.date));

        for (field, value) in [("performer", &performer), ("venue", &venue), ("genre", &genre)] {
            if value.is_empty() {
                warnings.push(NormalizeWarning::MissingField { field: field.to_string() });
            }
        }

        CleanedFields {
            performer,
            venue,
            location,
            genre,
            date_text,
            time_text,
        }
    }

    /// Normalizes and classifies one listing. Never fails: an unresolvable date
    /// quarantines the listing instead.
    pub fn process(&self, raw: &RawListing) -> ListingOutcome {
        let mut warnings = Vec::new();
        let fields = self.clean_fields(raw, &mut warnings);
        let ranking = raw.ranking.trim();

        match self
            .date_parser
            .parse(&fields.date_text, fields.time_text.as_deref(), &mut warnings)
        {
            Ok(parsed) => {
                debug!(listing_id = %raw.id, festival = parsed.is_range(), "Classified listing");
                ListingOutcome::Classified {
                    record: classify(&raw.id, &fields, parsed, ranking),
                    warnings,
                }
            }
            Err(e) => ListingOutcome::Quarantined {
                listing: QuarantinedListing {
                    id: raw.id.clone(),
                    date_text: fields.date_text,
                    reason: e.to_string(),
                },
                warnings,
            },
        }
    }

    fn process_part(&self, listings: &[RawListing]) -> BatchPart {
        let mut part = BatchPart::default();
        for raw in listings {
            part.absorb(&raw.id, self.process(raw));
        }
        part
    }

    /// Processes a batch in order on the current thread.
    #[instrument(skip(self, listings), fields(total = listings.len()))]
    pub fn run_batch(&self, listings: &[RawListing]) -> BatchResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let result = BatchResult::from_part(listings.len(), self.process_part(listings), started_at);
        result.record_metrics(clock.elapsed().as_secs_f64());
        result
    }

    /// Splits the batch into one contiguous partition per worker, processes the partitions
    /// on the blocking pool and merges them back in input order. Output is identical to
    /// [`ListingPipeline::run_batch`].
    #[instrument(skip(self, listings), fields(total = listings.len()))]
    pub async fn run_batch_parallel(
        self: Arc<Self>,
        listings: Vec<RawListing>,
        workers: usize,
    ) -> Result<BatchResult> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let total = listings.len();
        let workers = effective_workers(workers);

        let chunk_size = total.div_ceil(workers).max(1);
        let mut handles = Vec::with_capacity(workers);
        let mut remaining = listings;
        while !remaining.is_empty() {
            let rest = remaining.split_off(chunk_size.min(remaining.len()));
            let chunk = std::mem::replace(&mut remaining, rest);
            let pipeline = Arc::clone(&self);
            handles.push(tokio::task::spawn_blocking(move || pipeline.process_part(&chunk)));
        }
        debug!(partitions = handles.len(), workers, chunk_size, "Dispatched batch partitions");

        let mut merged = BatchPart::default();
        for handle in handles {
            merged.extend(handle.await?);
        }

        let result = BatchResult::from_part(total, merged, started_at);
        result.record_metrics(clock.elapsed().as_secs_f64());
        Ok(result)
    }
}

/// 0 means one worker per available core.
fn effective_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn pipeline() -> ListingPipeline {
        ListingPipeline::new(&NormalizeConfig::default()).unwrap()
    }

    fn listing(id: &str, date: &str) -> RawListing {
        RawListing {
            id: id.into(),
            performer: "\nPerformer:\n\n\nThe Band".into(),
            venue: "Hall\n1 Main St, Austin, TX, United States".into(),
            date: date.into(),
            genre: "Rock / Pop".into(),
            ranking: "5".into(),
        }
    }

    #[test]
    fn test_process_concert() {
        match pipeline().process(&listing("1", "Date:\nSat, June 3, 2023 | 8:00pm")) {
            ListingOutcome::Classified {
                record: ClassifiedRecord::Concert(c),
                warnings,
            } => {
                assert_eq!(c.date, NaiveDate::from_ymd_opt(2023, 6, 3).unwrap());
                assert_eq!(c.time, NaiveTime::from_hms_opt(20, 0, 0));
                assert_eq!(c.performer, "The Band");
                assert_eq!(c.location, "Austin, TX");
                assert_eq!(c.genre, "Rock, Pop");
                assert!(warnings.is_empty());
            }
            other => panic!("expected concert, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_time_is_a_warning_not_a_failure() {
        match pipeline().process(&listing("2", "Sat, June 3, 2023 | late")) {
            ListingOutcome::Classified {
                record: ClassifiedRecord::Concert(c),
                warnings,
            } => {
                assert_eq!(c.time, None);
                assert_eq!(warnings, vec![NormalizeWarning::MalformedTime { raw: "late".into() }]);
            }
            other => panic!("expected concert, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_cells_warn() {
        let raw = RawListing {
            id: "3".into(),
            date: "Sat, June 3, 2023".into(),
            ..Default::default()
        };
        match pipeline().process(&raw) {
            ListingOutcome::Classified { warnings, .. } => assert_eq!(warnings.len(), 3),
            other => panic!("expected concert, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_quarantined() {
        match pipeline().process(&listing("4", "TBA")) {
            ListingOutcome::Quarantined { listing, .. } => {
                assert_eq!(listing.id, "4");
                assert_eq!(listing.date_text, "TBA");
            }
            other => panic!("expected quarantine, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_partitions_every_listing() {
        let batch = vec![
            listing("a", "Sat, June 3, 2023 | 8:00pm"),
            listing("b", "Fri, July 14, 2023 - Sun, July 16, 2023"),
            listing("c", "TBA"),
            listing("d", "June 10, 2023"),
        ];
        let result = pipeline().run_batch(&batch);
        assert_eq!(result.total_listings, 4);
        assert_eq!(result.concert_count(), 2);
        assert_eq!(result.festival_count(), 1);
        assert_eq!(result.quarantined_count(), 1);
        assert_eq!(
            result.concert_count() + result.festival_count() + result.quarantined_count(),
            result.total_listings
        );
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let batch: Vec<RawListing> = (1..=23)
            .map(|day| {
                let date = if day % 5 == 0 {
                    format!("Fri, July {}, 2023 - Sun, July {}, 2023", day, day + 2)
                } else if day % 7 == 0 {
                    "soon".to_string()
                } else {
                    format!("June {}, 2023 | 7:30pm", day)
                };
                listing(&day.to_string(), &date)
            })
            .collect();

        let pipeline = Arc::new(pipeline());
        let sequential = pipeline.run_batch(&batch);
        let parallel = Arc::clone(&pipeline).run_batch_parallel(batch, 4).await.unwrap();

        assert_eq!(parallel.records, sequential.records);
        assert_eq!(parallel.quarantined, sequential.quarantined);
        assert_eq!(parallel.warnings, sequential.warnings);
    }

    #[tokio::test]
    async fn test_parallel_empty_batch() {
        let result = Arc::new(pipeline()).run_batch_parallel(Vec::new(), 0).await.unwrap();
        assert_eq!(result.total_listings, 0);
        assert!(result.records.is_empty());
    }
}
