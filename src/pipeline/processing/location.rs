//! Location Resolver: venue cell -> (venue name, `city, state`).

use super::clean::strip_label;

#[derive(Debug, Clone)]
pub struct LocationResolver {
    label: String,
    country_suffix: String,
}

impl LocationResolver {
    pub fn new(venue_label: impl Into<String>, country_suffix: impl Into<String>) -> Self {
        Self {
            label: format!("{}:", venue_label.into()),
            country_suffix: country_suffix.into(),
        }
    }

    /// The first line of the cell is the venue name, the rest is its address. Only the
    /// last two address parts (city, state) are kept. A cell without an address yields an
    /// empty location; a one-part address is kept as is.
    pub fn resolve_location(&self, venue_cell: &str) -> (String, String) {
        let text = strip_label(venue_cell, &self.label);
        let (name, remainder) = match text.split_once('\n') {
            Some((name, rest)) => (name, rest),
            None => (text, ""),
        };
        let venue = name.replace('\t', " ").trim().to_string();

        let parts: Vec<&str> = self
            .strip_country(remainder)
            .split(|c| c == ',' || c == '\n')
            .map(|part| part.trim_matches(|c: char| c.is_whitespace() || c.is_control()))
            .filter(|part| !part.is_empty())
            .collect();

        let keep_from = parts.len().saturating_sub(2);
        let location = parts[keep_from..].join(", ");
        (venue, location)
    }

    /// Removes trailing country suffixes (case-insensitive), with or without a comma
    /// before them. The suffix must start on a word boundary.
    fn strip_country<'a>(&self, address: &'a str) -> &'a str {
        let suffix = self.country_suffix.as_str();
        let mut text = trim_address_end(address);
        if suffix.is_empty() {
            return text;
        }
        while text.len() >= suffix.len() {
            let start = text.len() - suffix.len();
            if !text.is_char_boundary(start) || !text[start..].eq_ignore_ascii_case(suffix) {
                break;
            }
            let head = &text[..start];
            if head.chars().next_back().is_some_and(char::is_alphanumeric) {
                break;
            }
            text = trim_address_end(head);
        }
        text
    }
}

fn trim_address_end(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == ',' || c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocationResolver {
        LocationResolver::new("Venue", "United States")
    }

    #[test]
    fn test_street_address_is_dropped() {
        let (venue, location) = resolver().resolve_location(
            "Madison Square Garden\n4 Pennsylvania Plaza, New York, NY, United States",
        );
        assert_eq!(venue, "Madison Square Garden");
        assert_eq!(location, "New York, NY");
    }

    #[test]
    fn test_labelled_cell_with_tabs() {
        let (venue, location) = resolver().resolve_location(
            "\nVenue:\n\nThe Fillmore\n\t\t1805 Geary Blvd,\n\tSan Francisco, CA, United States\n\t",
        );
        assert_eq!(venue, "The Fillmore");
        assert_eq!(location, "San Francisco, CA");
    }

    #[test]
    fn test_city_state_only() {
        let (_, location) = resolver().resolve_location("Red Rocks\nMorrison, CO, United States");
        assert_eq!(location, "Morrison, CO");
    }

    #[test]
    fn test_one_token_location_is_partial() {
        let (venue, location) = resolver().resolve_location("Somewhere Hall\nAustin");
        assert_eq!(venue, "Somewhere Hall");
        assert_eq!(location, "Austin");
    }

    #[test]
    fn test_venue_without_newline_has_no_location() {
        let (venue, location) = resolver().resolve_location("Just A Venue Name");
        assert_eq!(venue, "Just A Venue Name");
        assert_eq!(location, "");
    }

    #[test]
    fn test_empty_cell() {
        assert_eq!(resolver().resolve_location(""), (String::new(), String::new()));
    }

    #[test]
    fn test_country_without_comma_is_stripped() {
        let (venue, location) = resolver().resolve_location("Hall\nNew York NY United States");
        assert_eq!(venue, "Hall");
        assert_eq!(location, "New York NY");

        let (_, location) = resolver().resolve_location("Hall\nPortland, OR united states\n\t");
        assert_eq!(location, "Portland, OR");
    }

    #[test]
    fn test_country_inside_a_word_is_kept() {
        let resolver = LocationResolver::new("Venue", "USA");
        let (_, location) = resolver.resolve_location("Hall\nSpringfield, MO, BUSA");
        assert_eq!(location, "MO, BUSA");
    }

    #[test]
    fn test_country_only_is_empty() {
        let (_, location) = resolver().resolve_location("Hall\nUnited States");
        assert_eq!(location, "");
    }
}
