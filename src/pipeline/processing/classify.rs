//! Record Classifier & Router.

use serde::Serialize;

use crate::types::{ClassifiedRecord, CleanedFields, ConcertRecord, FestivalRecord, ParsedDate};

/// Builds the record matching the date shape: a single day is a concert, a range is a
/// festival. Festivals do not carry a genre.
pub fn classify(id: &str, fields: &CleanedFields, parsed: ParsedDate, ranking: &str) -> ClassifiedRecord {
    match parsed {
        ParsedDate::Single { date, time } => ClassifiedRecord::Concert(ConcertRecord {
            concert_id: id.to_string(),
            performer: fields.performer.clone(),
            venue: fields.venue.clone(),
            location: fields.location.clone(),
            date,
            time,
            genre: fields.genre.clone(),
            ranking: ranking.to_string(),
        }),
        ParsedDate::Range { start, end, time } => ClassifiedRecord::Festival(FestivalRecord {
            festival_id: id.to_string(),
            performer: fields.performer.clone(),
            venue: fields.venue.clone(),
            location: fields.location.clone(),
            start_date: start,
            end_date: end,
            time,
            concertful_ranking: ranking.to_string(),
        }),
    }
}

/// The two output collections. Records are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutedRecords {
    pub concerts: Vec<ConcertRecord>,
    pub festivals: Vec<FestivalRecord>,
}

impl RoutedRecords {
    pub fn route(&mut self, record: ClassifiedRecord) {
        match record {
            ClassifiedRecord::Concert(concert) => self.concerts.push(concert),
            ClassifiedRecord::Festival(festival) => self.festivals.push(festival),
        }
    }

    /// Appends another partition's records after this one's.
    pub fn extend(&mut self, other: RoutedRecords) {
        self.concerts.extend(other.concerts);
        self.festivals.extend(other.festivals);
    }

    pub fn len(&self) -> usize {
        self.concerts.len() + self.festivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn fields() -> CleanedFields {
        CleanedFields {
            performer: "A, B".into(),
            venue: "Hall".into(),
            location: "Austin, TX".into(),
            genre: "Rock, Pop".into(),
            date_text: String::new(),
            time_text: None,
        }
    }

    #[test]
    fn test_single_becomes_concert_with_genre() {
        let parsed = ParsedDate::Single {
            date: NaiveDate::from_ymd_opt(2023, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(20, 0, 0),
        };
        match classify("42", &fields(), parsed, "12") {
            ClassifiedRecord::Concert(c) => {
                assert_eq!(c.concert_id, "42");
                assert_eq!(c.genre, "Rock, Pop");
                assert_eq!(c.ranking, "12");
                assert_eq!(c.time, NaiveTime::from_hms_opt(20, 0, 0));
            }
            other => panic!("expected concert, got {:?}", other),
        }
    }

    #[test]
    fn test_range_becomes_festival() {
        let parsed = ParsedDate::Range {
            start: NaiveDate::from_ymd_opt(2023, 7, 14).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 7, 16).unwrap(),
            time: None,
        };
        match classify("fest", &fields(), parsed, "3") {
            ClassifiedRecord::Festival(f) => {
                assert_eq!(f.festival_id, "fest");
                assert_eq!(f.start_date, NaiveDate::from_ymd_opt(2023, 7, 14).unwrap());
                assert_eq!(f.end_date, NaiveDate::from_ymd_opt(2023, 7, 16).unwrap());
                assert_eq!(f.concertful_ranking, "3");
            }
            other => panic!("expected festival, got {:?}", other),
        }
    }

    #[test]
    fn test_router_appends_in_order() {
        let mut routed = RoutedRecords::default();
        for (id, day) in [("a", 1), ("b", 2)] {
            let parsed = ParsedDate::Single {
                date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
                time: None,
            };
            routed.route(classify(id, &fields(), parsed, ""));
        }
        let ids: Vec<_> = routed.concerts.iter().map(|c| c.concert_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(routed.festivals.is_empty());
        assert_eq!(routed.len(), 2);
    }
}
