//! Date/Time Parser.
//!
//! Turns a cleaned date cell such as `Sat, June 3, 2023 | 8:00pm` or
//! `Fri, July 14, 2023 - Sun, July 16, 2023` into a [`ParsedDate`]. The cell is rewritten
//! step by step into slash-delimited `MM/DD/YYYY` tokens; each step leaves the text alone
//! when it finds nothing to do. The final shape decides Single vs Range.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::config::NormalizeConfig;
use crate::constants::{SLASH_DATE_FORMAT, SLASH_DATE_LEN, WEEKDAY_MIN_PREFIX};
use crate::error::{PipelineError, Result};
use crate::types::{NormalizeWarning, ParsedDate};

const TIME_DELIMITER: char = '|';
const TIME_FORMATS: [&str; 2] = ["%I:%M%p", "%I:%M %p"];

static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").expect("valid dash pattern"));
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",?\s+|,").expect("valid separator pattern"));
static RANGE_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"/*-/*").expect("valid range gap pattern"));

/// Calendar shape of a date cell once weekdays, month names and separators are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpan {
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

/// Splits a date cell on the first `|` into the date part and the time part, if any.
pub fn split_time(cell: &str) -> (String, Option<String>) {
    match cell.split_once(TIME_DELIMITER) {
        Some((date, time)) => {
            let time = time.trim();
            let time = if time.is_empty() { None } else { Some(time.to_string()) };
            (date.trim().to_string(), time)
        }
        None => (cell.trim().to_string(), None),
    }
}

/// Parses a 12-hour clock time like `8:00pm` or `11:30 AM`.
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .ok_or_else(|| PipelineError::MalformedTime { raw: text.to_string() })
}

pub struct DateTimeParser {
    month_pattern: Regex,
    /// Lowercased month name -> two-digit code
    month_codes: HashMap<String, String>,
    /// Lowercased full weekday names
    weekdays: Vec<String>,
}

impl DateTimeParser {
    pub fn new(config: &NormalizeConfig) -> Result<Self> {
        config.validate()?;

        // Longest names first so an abbreviation in the table never shadows a full name
        let mut names: Vec<&String> = config.months.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let month_pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
            .map_err(|e| PipelineError::Config(format!("invalid month table: {}", e)))?;

        Ok(Self {
            month_pattern,
            month_codes: config
                .months
                .iter()
                .map(|(name, code)| (name.to_lowercase(), code.clone()))
                .collect(),
            weekdays: config.weekdays.iter().map(|d| d.to_lowercase()).collect(),
        })
    }

    /// Parses a cleaned date cell (time part already split off) plus its optional time.
    ///
    /// An unparseable time is dropped and reported through `warnings`; an unparseable
    /// date is an error the caller quarantines.
    pub fn parse(
        &self,
        date_text: &str,
        time_text: Option<&str>,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<ParsedDate> {
        let time = match time_text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(raw) => match parse_time(raw) {
                Ok(t) => Some(t),
                Err(_) => {
                    debug!(raw_time = %raw, "Dropping unparseable time");
                    warnings.push(NormalizeWarning::MalformedTime { raw: raw.to_string() });
                    None
                }
            },
            None => None,
        };

        Ok(match self.parse_date_text(date_text)? {
            DateSpan::Single(date) => ParsedDate::Single { date, time },
            DateSpan::Range(start, end) => ParsedDate::Range { start, end, time },
        })
    }

    /// Runs the rewrite steps over a date part and resolves the resulting shape.
    pub fn parse_date_text(&self, date_text: &str) -> Result<DateSpan> {
        if date_text.trim().is_empty() {
            return Err(PipelineError::malformed_date(date_text, "empty date cell"));
        }
        let text = self.strip_leading_weekday(date_text);
        let text = self.canonicalize_months(&text);
        let text = normalize_separators(&text);
        let text = self.strip_embedded_weekdays(&text);
        resolve_shape(&text).map_err(|e| match e {
            PipelineError::MalformedDate { reason, .. } => {
                PipelineError::malformed_date(date_text, format!("{} (normalized to '{}')", reason, text))
            }
            other => other,
        })
    }

    /// True for a full weekday name or an abbreviation of one (`Sat`, `Tues`, `Thurs.`).
    pub fn is_weekday(&self, token: &str) -> bool {
        let token = token.trim().trim_end_matches('.').to_lowercase();
        token.len() >= WEEKDAY_MIN_PREFIX
            && token.chars().all(|c| c.is_ascii_alphabetic())
            && self.weekdays.iter().any(|day| day.starts_with(&token))
    }

    /// Drops the text before the first comma when it is a weekday.
    pub fn strip_leading_weekday(&self, date_part: &str) -> String {
        match date_part.split_once(',') {
            Some((head, rest)) if self.is_weekday(head) => rest.trim().to_string(),
            _ => date_part.trim().to_string(),
        }
    }

    /// Replaces every month name with its two-digit code.
    pub fn canonicalize_months(&self, text: &str) -> String {
        self.month_pattern
            .replace_all(text, |caps: &regex::Captures| {
                let name = caps[0].to_lowercase();
                self.month_codes.get(&name).cloned().unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Removes weekday tokens left between slashes and closes the gap around the range dash.
    pub fn strip_embedded_weekdays(&self, text: &str) -> String {
        let kept = text
            .split('/')
            .filter(|token| !self.is_weekday(token))
            .collect::<Vec<_>>()
            .join("/");
        RANGE_GAP.replace_all(&kept, "-").into_owned()
    }
}

/// Rewrites spaces and `, ` into `/`, isolates the range dash as its own token and
/// zero-pads one-digit day/month tokens.
pub fn normalize_separators(text: &str) -> String {
    let text = DASH.replace_all(text.trim(), "/-/");
    let text = SEPARATOR.replace_all(&text, "/");
    text.split('/')
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token.len() == 1 && token.chars().all(|c| c.is_ascii_digit()) {
                format!("0{}", token)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Exactly `MM/DD/YYYY` is a single day; otherwise the text must be two such dates
/// joined by `-`.
pub fn resolve_shape(text: &str) -> Result<DateSpan> {
    if text.len() == SLASH_DATE_LEN && !text.contains('-') {
        return parse_slash_date(text).map(DateSpan::Single);
    }
    match text.split_once('-') {
        Some((start, end)) => {
            let start = parse_slash_date(start)?;
            let end = parse_slash_date(end)?;
            Ok(DateSpan::Range(start, end))
        }
        None => Err(PipelineError::malformed_date(text, "neither a single date nor a range")),
    }
}

fn parse_slash_date(token: &str) -> Result<NaiveDate> {
    if token.len() != SLASH_DATE_LEN {
        return Err(PipelineError::malformed_date(token, "not an MM/DD/YYYY token"));
    }
    NaiveDate::parse_from_str(token, SLASH_DATE_FORMAT)
        .map_err(|e| PipelineError::malformed_date(token, e.to_string()))
}
