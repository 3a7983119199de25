use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::constants::{EVENT_URLS_PREFIX, RAW_LISTINGS_PREFIX};
use crate::error::Result;
use crate::types::RawListing;

pub fn snapshot_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.json", RAW_LISTINGS_PREFIX, date.format("%Y-%m-%d")))
}

/// Writes the raw batch as pretty JSON and returns the file path.
pub fn write_raw_batch(dir: &Path, date: NaiveDate, listings: &[RawListing]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = snapshot_path(dir, date);
    let json = serde_json::to_string_pretty(listings)?;
    fs::write(&path, json)?;
    info!("Saved {} raw listings to {}", listings.len(), path.display());
    Ok(path)
}

pub fn read_raw_batch(path: &Path) -> Result<Vec<RawListing>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes discovered event URLs one per line, in the format `read_url_list` accepts.
pub fn write_url_list(dir: &Path, date: NaiveDate, urls: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_{}.txt", EVENT_URLS_PREFIX, date.format("%Y-%m-%d")));
    let mut content = urls.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    info!("Saved {} event URLs to {}", urls.len(), path.display());
    Ok(path)
}

/// One URL per line; blank lines and `#` comments are skipped.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
