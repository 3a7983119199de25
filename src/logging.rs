use std::fs;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "pipeline.log";

/// Initializes console logging plus a JSON log file rotated daily under `logs/`.
///
/// The returned guard flushes the file writer when dropped, so `main` should hold it
/// for the lifetime of the process.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("concert_pipeline=info"));

    match fs::create_dir_all(LOG_DIR) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            build_subscriber(filter, Some(non_blocking_writer)).init();
            Some(guard)
        }
        Err(e) => {
            // No file layer; console only
            build_subscriber(filter, None).init();
            tracing::warn!("Could not create log directory '{}': {}", LOG_DIR, e);
            None
        }
    }
}

/// Filter, optional JSON file layer and console layer in one stack.
fn build_subscriber(filter: EnvFilter, file_writer: Option<NonBlocking>) -> impl Subscriber + Send + Sync {
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
}
