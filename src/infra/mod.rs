pub mod http_client;
pub mod output_adapter;
pub mod raw_snapshot;

pub use http_client::ReqwestPageSource;
pub use output_adapter::{InMemoryRecordSink, NdjsonRecordSink, OutputPaths};
