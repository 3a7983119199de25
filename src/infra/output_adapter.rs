use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::app::ports::RecordSinkPort;
use crate::constants::{CONCERTS_PREFIX, FESTIVALS_PREFIX, QUARANTINE_PREFIX};
use crate::error::Result;
use crate::types::{ClassifiedRecord, ConcertRecord, FestivalRecord, QuarantinedListing};

/// Paths of the files a run writes, named by the run date.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub concerts: PathBuf,
    pub festivals: PathBuf,
    pub quarantine: PathBuf,
}

impl OutputPaths {
    pub fn for_date(dir: &Path, date: NaiveDate) -> Self {
        let stamp = date.format("%Y-%m-%d");
        Self {
            concerts: dir.join(format!("{}_{}.ndjson", CONCERTS_PREFIX, stamp)),
            festivals: dir.join(format!("{}_{}.ndjson", FESTIVALS_PREFIX, stamp)),
            quarantine: dir.join(format!("{}_{}.ndjson", QUARANTINE_PREFIX, stamp)),
        }
    }
}

/// Writes concerts, festivals and quarantined listings to separate NDJSON files
pub struct NdjsonRecordSink {
    paths: OutputPaths,
    concerts: Mutex<BufWriter<File>>,
    festivals: Mutex<BufWriter<File>>,
    quarantine: Mutex<BufWriter<File>>,
}

impl NdjsonRecordSink {
    /// Creates `dir` if needed and truncates any output already written for `date`.
    pub fn create(dir: &Path, date: NaiveDate) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let paths = OutputPaths::for_date(dir, date);

        info!("Creating output files:");
        info!("  Concerts: {}", paths.concerts.display());
        info!("  Festivals: {}", paths.festivals.display());
        info!("  Quarantine: {}", paths.quarantine.display());

        Ok(Self {
            concerts: Mutex::new(open_truncated(&paths.concerts)?),
            festivals: Mutex::new(open_truncated(&paths.festivals)?),
            quarantine: Mutex::new(open_truncated(&paths.quarantine)?),
            paths,
        })
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }
}

fn open_truncated(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    Ok(BufWriter::new(file))
}

async fn write_line<T: Serialize>(writer: &Mutex<BufWriter<File>>, value: &T) -> Result<()> {
    let line = serde_json::to_string(value)?;
    let mut writer = writer.lock().await;
    writeln!(writer, "{}", line)?;
    Ok(())
}

#[async_trait]
impl RecordSinkPort for NdjsonRecordSink {
    async fn write_record(&self, record: &ClassifiedRecord) -> Result<()> {
        match record {
            ClassifiedRecord::Concert(concert) => write_line(&self.concerts, concert).await,
            ClassifiedRecord::Festival(festival) => write_line(&self.festivals, festival).await,
        }
    }

    async fn write_quarantined(&self, listing: &QuarantinedListing) -> Result<()> {
        write_line(&self.quarantine, listing).await
    }

    async fn flush(&self) -> Result<()> {
        for writer in [&self.concerts, &self.festivals, &self.quarantine] {
            writer.lock().await.flush()?;
        }
        Ok(())
    }
}

/// Collects everything in memory
#[derive(Default)]
pub struct InMemoryRecordSink {
    pub concerts: Mutex<Vec<ConcertRecord>>,
    pub festivals: Mutex<Vec<FestivalRecord>>,
    pub quarantined: Mutex<Vec<QuarantinedListing>>,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSinkPort for InMemoryRecordSink {
    async fn write_record(&self, record: &ClassifiedRecord) -> Result<()> {
        match record {
            ClassifiedRecord::Concert(concert) => self.concerts.lock().await.push(concert.clone()),
            ClassifiedRecord::Festival(festival) => self.festivals.lock().await.push(festival.clone()),
        }
        Ok(())
    }

    async fn write_quarantined(&self, listing: &QuarantinedListing) -> Result<()> {
        self.quarantined.lock().await.push(listing.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn concert(id: &str) -> ClassifiedRecord {
        ClassifiedRecord::Concert(ConcertRecord {
            concert_id: id.into(),
            performer: "A".into(),
            venue: "Hall".into(),
            location: "Austin, TX".into(),
            date: NaiveDate::from_ymd_opt(2023, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(20, 0, 0),
            genre: "Rock".into(),
            ranking: "1".into(),
        })
    }

    #[tokio::test]
    async fn test_ndjson_sink_writes_dated_files() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let sink = NdjsonRecordSink::create(dir.path(), date).unwrap();
        sink.write_record(&concert("1")).await.unwrap();
        sink.write_record(&concert("2")).await.unwrap();
        sink.write_quarantined(&QuarantinedListing {
            id: "3".into(),
            date_text: "TBA".into(),
            reason: "bad".into(),
        })
        .await
        .unwrap();
        sink.flush().await.unwrap();

        let concerts_path = dir.path().join("cleaned_concerts_2024-01-02.ndjson");
        assert_eq!(sink.paths().concerts, concerts_path);
        let content = std::fs::read_to_string(concerts_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["concert_id"], "1");
        assert_eq!(first["time"], "20:00");

        let festivals = std::fs::read_to_string(&sink.paths().festivals).unwrap();
        assert!(festivals.is_empty());
        let quarantine = std::fs::read_to_string(&sink.paths().quarantine).unwrap();
        assert_eq!(quarantine.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_sink_routes() {
        let sink = InMemoryRecordSink::new();
        sink.write_record(&concert("1")).await.unwrap();
        assert_eq!(sink.concerts.lock().await.len(), 1);
        assert!(sink.festivals.lock().await.is_empty());
    }
}
