pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;
pub mod observability;

pub use config::{AppConfig, NormalizeConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{BatchResult, ListingOutcome, ListingPipeline};
pub use types::{ClassifiedRecord, ConcertRecord, FestivalRecord, ParsedDate, QuarantinedListing, RawListing};
