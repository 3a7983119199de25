//! Pulls the listing cells out of an event page.

use scraper::{ElementRef, Html, Selector};

use crate::error::{PipelineError, Result};
use crate::types::RawListing;

const ROW_SELECTOR: &str = "tr";
const RANKING_SELECTOR: &str = ".aln";

/// Performer, venue, date and genre, in page order
const CELL_ROWS: usize = 4;

pub struct ListingExtractor {
    row: Selector,
    ranking: Selector,
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector(ROW_SELECTOR)?,
            ranking: parse_selector(RANKING_SELECTOR)?,
        })
    }

    /// Builds a raw listing from `html`. Missing rows or ranking leave the cell empty.
    pub fn extract(&self, url: &str, html: &str) -> RawListing {
        let document = Html::parse_document(html);
        let mut cells: Vec<String> = document.select(&self.row).take(CELL_ROWS).map(element_text).collect();
        cells.resize(CELL_ROWS, String::new());
        let [performer, venue, date, genre]: [String; CELL_ROWS] = match cells.try_into() {
            Ok(cells) => cells,
            Err(_) => Default::default(),
        };

        let ranking = document
            .select(&self.ranking)
            .next()
            .map(|el| element_text(el).trim().trim_start_matches('#').trim().to_string())
            .unwrap_or_default();

        RawListing {
            id: listing_id(url),
            performer,
            venue,
            date,
            genre,
            ranking,
        }
    }
}

/// The last non-empty path segment of the page URL.
pub fn listing_id(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PipelineError::Config(format!("invalid selector '{}': {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <span class="aln">#17</span>
        <table>
          <tr><td>Performer:</td><td>Alpha</td></tr>
          <tr><td>Venue:</td><td>The Hall</td></tr>
          <tr><td>Date:</td><td>Sat, June 3, 2023 | 8:00pm</td></tr>
          <tr><td>Genre:</td><td>Rock / Pop</td></tr>
          <tr><td>Extra:</td><td>ignored</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn test_extracts_first_four_rows() {
        let listing = ListingExtractor::new()
            .unwrap()
            .extract("https://www.concertful.com/event/12345/", PAGE);
        assert_eq!(listing.id, "12345");
        assert!(listing.performer.contains("Alpha"));
        assert!(listing.venue.contains("The Hall"));
        assert!(listing.date.contains("June 3, 2023"));
        assert!(listing.genre.contains("Rock / Pop"));
        assert_eq!(listing.ranking, "17");
    }

    #[test]
    fn test_missing_rows_are_empty() {
        let listing = ListingExtractor::new()
            .unwrap()
            .extract("https://x.test/e/1", "<table><tr><td>Only</td></tr></table>");
        assert!(listing.performer.contains("Only"));
        assert_eq!(listing.venue, "");
        assert_eq!(listing.genre, "");
        assert_eq!(listing.ranking, "");
    }

    #[test]
    fn test_listing_id() {
        assert_eq!(listing_id("https://a.test/event/abc"), "abc");
        assert_eq!(listing_id("https://a.test/event/abc/?ref=x"), "abc");
    }
}
