use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One scraped event page, as handed over by the extraction stage.
///
/// Every cell is free text straight off the page and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawListing {
    pub id: String,
    pub performer: String,
    pub venue: String,
    pub date: String,
    pub genre: String,
    pub ranking: String,
}

/// Text fields after label/whitespace cleanup, before any semantic parsing of the date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedFields {
    pub performer: String,
    pub venue: String,
    /// `city, state`, a best-effort partial, or empty
    pub location: String,
    pub genre: String,
    pub date_text: String,
    pub time_text: Option<String>,
}

/// The shape a listing's date cell resolved to. Decided once, from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedDate {
    Single {
        date: NaiveDate,
        #[serde(default, with = "hour_minute")]
        time: Option<NaiveTime>,
    },
    /// `time` is the listing's printed start time; it does not belong to either end of
    /// the range and is carried onto the record as-is.
    Range {
        start: NaiveDate,
        end: NaiveDate,
        #[serde(default, with = "hour_minute")]
        time: Option<NaiveTime>,
    },
}

impl ParsedDate {
    pub fn is_range(&self) -> bool {
        matches!(self, ParsedDate::Range { .. })
    }
}

/// Non-fatal conditions picked up while normalizing a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizeWarning {
    MalformedTime { raw: String },
    MissingField { field: String },
}

impl NormalizeWarning {
    pub fn label(&self) -> &'static str {
        match self {
            NormalizeWarning::MalformedTime { .. } => "malformed_time",
            NormalizeWarning::MissingField { .. } => "missing_field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcertRecord {
    pub concert_id: String,
    pub performer: String,
    pub venue: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(default, with = "hour_minute")]
    pub time: Option<NaiveTime>,
    pub genre: String,
    pub ranking: String,
}

/// Multi-day event. Genre is not carried: festivals rarely map to a single genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalRecord {
    pub festival_id: String,
    pub performer: String,
    pub venue: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, with = "hour_minute")]
    pub time: Option<NaiveTime>,
    pub concertful_ranking: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifiedRecord {
    Concert(ConcertRecord),
    Festival(FestivalRecord),
}

/// A listing excluded from both outputs because its date could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantinedListing {
    pub id: String,
    pub date_text: String,
    pub reason: String,
}

/// Serializes clock times as `HH:MM`; accepts `HH:MM` or `HH:MM:SS` on the way in.
pub mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => NaiveTime::parse_from_str(&s, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
