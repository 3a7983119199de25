//! Genre/Performer Splitter.

use once_cell::sync::Lazy;
use regex::Regex;

/// The "and More >>" link printed after a truncated performer list, with whatever
/// tab/comma padding precedes it.
static MORE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,\s]*\band\s+more\s*>+\s*$").expect("valid marker pattern")
});

/// Splits `cell` on `delimiter`, trims every value, drops empties and joins the rest with
/// `", "`. Source order is kept.
pub fn split_values(cell: &str, delimiter: char) -> String {
    cell.split(delimiter)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct ValueSplitter {
    others_suffix: String,
}

impl ValueSplitter {
    pub fn new(others_suffix: impl Into<String>) -> Self {
        Self {
            others_suffix: others_suffix.into(),
        }
    }

    /// Genres come as `Rock / Pop`.
    pub fn genres(&self, cell: &str) -> String {
        split_values(cell, '/')
    }

    /// Performers arrive comma-joined from the cleaner. A trailing "and More >>" marker is
    /// replaced by the configured suffix.
    pub fn performers(&self, cell: &str) -> String {
        match MORE_MARKER.find(cell) {
            Some(marker) => {
                let listed = split_values(&cell[..marker.start()], ',');
                if listed.is_empty() {
                    self.others_suffix.clone()
                } else {
                    format!("{}, {}", listed, self.others_suffix)
                }
            }
            None => split_values(cell, ','),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genres_split_on_slash() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.genres("Rock / Pop"), "Rock, Pop");
        assert_eq!(splitter.genres("Hip-Hop/Rap / R&B"), "Hip-Hop, Rap, R&B");
        assert_eq!(splitter.genres("Jazz"), "Jazz");
    }

    #[test]
    fn test_empty_genre_is_empty() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.genres(""), "");
        assert_eq!(splitter.genres(" / "), "");
    }

    #[test]
    fn test_performers_keep_order() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.performers("Headliner, Support, Opener"), "Headliner, Support, Opener");
    }

    #[test]
    fn test_tab_padded_more_marker() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.performers("A, B, \t\t\tand More >>"), "A, B, others");
        assert_eq!(splitter.performers("A, B, and More >>"), "A, B, others");
        assert_eq!(splitter.performers("A\t\t\t\t\tand More >>"), "A, others");
    }

    #[test]
    fn test_marker_alone() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.performers("and More >>"), "others");
    }

    #[test]
    fn test_band_name_containing_and_more_is_untouched() {
        let splitter = ValueSplitter::new("others");
        assert_eq!(splitter.performers("Sand Moreno"), "Sand Moreno");
        assert_eq!(splitter.performers("Sugar and More Band"), "Sugar and More Band");
    }

    #[test]
    fn test_custom_suffix() {
        let splitter = ValueSplitter::new("+ more");
        assert_eq!(splitter.performers("A, and More >>"), "A, + more");
    }
}
