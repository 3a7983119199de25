pub mod ports;
pub mod ingest_use_case;
pub mod normalize_use_case;
