// Ingestion: URL discovery, page fetching and listing extraction

pub mod discovery;
pub mod extractor;
pub mod fetcher;

pub use discovery::UrlDiscovery;
pub use extractor::ListingExtractor;
pub use fetcher::{fetch_all, FetchedPage};
