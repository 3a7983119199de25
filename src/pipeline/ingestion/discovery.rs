//! Event URL discovery.
//!
//! Walks the area index to its region pages, follows each region's `?page=N` listing
//! pages and collects every event link. URLs are returned once each, in crawl order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use super::fetcher::fetch_all;
use crate::app::ports::PageSourcePort;
use crate::error::{PipelineError, Result};

const PAGE_COUNTER_SELECTOR: &str = "div.buttons_counter > span";
const EVENT_LINK_SELECTOR: &str = "a[href*='/event/']";

pub struct UrlDiscovery {
    area_url: Url,
    region_link: Selector,
    page_counter: Selector,
    event_link: Selector,
}

impl UrlDiscovery {
    pub fn new(area_url: &str) -> Result<Self> {
        let area_url = Url::parse(area_url)
            .map_err(|e| PipelineError::Config(format!("invalid area url '{}': {}", area_url, e)))?;
        let region_css = format!("a[href*='{}'][href$='/']", area_url.path());
        Ok(Self {
            region_link: parse_selector(&region_css)?,
            page_counter: parse_selector(PAGE_COUNTER_SELECTOR)?,
            event_link: parse_selector(EVENT_LINK_SELECTOR)?,
            area_url,
        })
    }

    /// Region pages linked from the area index, excluding the index itself.
    pub fn region_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let links = document
            .select(&self.region_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.area_url.join(href).ok())
            .filter(|url| url.path() != self.area_url.path())
            .map(String::from);
        dedup(links)
    }

    /// Listing page count from the `1 of N` counter; 1 when the counter is absent.
    pub fn page_count(&self, html: &str) -> usize {
        let document = Html::parse_document(html);
        document
            .select(&self.page_counter)
            .next()
            .and_then(|span| {
                span.text()
                    .collect::<String>()
                    .split_whitespace()
                    .last()
                    .and_then(|n| n.parse::<usize>().ok())
            })
            .unwrap_or(1)
            .max(1)
    }

    /// Absolute event links on a listing page.
    pub fn event_links(&self, page_url: &str, html: &str) -> Vec<String> {
        let Ok(base) = Url::parse(page_url) else {
            return Vec::new();
        };
        let document = Html::parse_document(html);
        let links = document
            .select(&self.event_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| base.join(href).ok())
            .map(String::from);
        dedup(links)
    }

    /// Crawls the area index and returns every distinct event URL found.
    ///
    /// A failing area index is an error; failing region or listing pages are skipped.
    #[instrument(skip(self, source), fields(area = %self.area_url))]
    pub async fn discover(&self, source: Arc<dyn PageSourcePort>, concurrency: usize) -> Result<Vec<String>> {
        let index = source.fetch_page(self.area_url.as_str()).await?;
        let regions = self.region_links(&index);
        info!(regions = regions.len(), "Found region pages");

        let region_pages = fetch_all(Arc::clone(&source), regions, concurrency).await;

        // Page 1 is the region page itself; later pages are fetched in one batch
        let mut extra_urls = Vec::new();
        for region in &region_pages {
            let pages = self.page_count(&region.body);
            debug!(region = %region.url, pages, "Region listing pages");
            extra_urls.extend((2..=pages).map(|page| listing_page_url(&region.url, page)));
        }
        let extra_pages: HashMap<String, String> = fetch_all(Arc::clone(&source), extra_urls, concurrency)
            .await
            .into_iter()
            .map(|page| (page.url, page.body))
            .collect();

        let mut event_urls = Vec::new();
        for region in &region_pages {
            event_urls.extend(self.event_links(&region.url, &region.body));
            for page in 2..=self.page_count(&region.body) {
                let url = listing_page_url(&region.url, page);
                match extra_pages.get(&url) {
                    Some(body) => event_urls.extend(self.event_links(&url, body)),
                    None => warn!(url = %url, "Listing page missing from crawl"),
                }
            }
        }

        let event_urls = dedup(event_urls);
        info!(events = event_urls.len(), "Discovery complete");
        Ok(event_urls)
    }
}

fn listing_page_url(region_url: &str, page: usize) -> String {
    format!("{}?page={}", region_url, page)
}

/// Keeps the first occurrence of every URL.
fn dedup(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PipelineError::Config(format!("invalid selector '{}': {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const AREA: &str = "https://concerts.test/area/united-states/";

    struct MockPageSource {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl MockPageSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, b)| (u.to_string(), b.to_string())).collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageSourcePort for MockPageSource {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| PipelineError::Fetch {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn site() -> MockPageSource {
        MockPageSource::new(&[
            (
                AREA,
                r#"<a href="/area/united-states/">All</a>
                   <a href="/area/united-states/washington/">Washington</a>
                   <a href="https://concerts.test/area/united-states/oregon/">Oregon</a>
                   <a href="/area/united-states/washington/">Washington again</a>
                   <a href="/area/united-states/idaho/">Idaho</a>
                   <a href="/about/">About</a>"#,
            ),
            (
                "https://concerts.test/area/united-states/washington/",
                r#"<div class="buttons_counter"><span>Page 1 of 2</span></div>
                   <a href="/event/a1/">A1</a><a href="/event/a2/">A2</a>"#,
            ),
            (
                "https://concerts.test/area/united-states/washington/?page=2",
                r#"<a href="/event/a2/">A2</a><a href="/event/a3/">A3</a>"#,
            ),
            (
                "https://concerts.test/area/united-states/oregon/",
                r#"<a href="/event/b1/">B1</a><a href="/event/a1/">A1 again</a>"#,
            ),
        ])
    }

    #[test]
    fn test_region_links_skip_index_and_duplicates() {
        let discovery = UrlDiscovery::new(AREA).unwrap();
        let source = site();
        let regions = discovery.region_links(&source.pages[AREA]);
        assert_eq!(
            regions,
            vec![
                "https://concerts.test/area/united-states/washington/",
                "https://concerts.test/area/united-states/oregon/",
                "https://concerts.test/area/united-states/idaho/",
            ]
        );
    }

    #[test]
    fn test_page_count() {
        let discovery = UrlDiscovery::new(AREA).unwrap();
        assert_eq!(
            discovery.page_count(r#"<div class="buttons_counter"><span>1 of 7</span></div>"#),
            7
        );
        assert_eq!(discovery.page_count("<p>no counter</p>"), 1);
        assert_eq!(
            discovery.page_count(r#"<div class="buttons_counter"><span>of many</span></div>"#),
            1
        );
    }

    #[tokio::test]
    async fn test_discover_walks_regions_and_pages() {
        let source = Arc::new(site());
        let discovery = UrlDiscovery::new(AREA).unwrap();
        let urls = discovery.discover(source.clone(), 4).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://concerts.test/event/a1/",
                "https://concerts.test/event/a2/",
                "https://concerts.test/event/a3/",
                "https://concerts.test/event/b1/",
            ]
        );
        let requested = source.requested.lock().unwrap();
        assert!(requested.contains(&"https://concerts.test/area/united-states/idaho/".to_string()));
        assert!(!requested.iter().any(|u| u.ends_with("?page=1")));
    }

    #[tokio::test]
    async fn test_discover_fails_without_index() {
        let discovery = UrlDiscovery::new(AREA).unwrap();
        let err = discovery
            .discover(Arc::new(MockPageSource::new(&[])), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { status: 404, .. }));
    }

    #[test]
    fn test_invalid_area_url() {
        assert!(matches!(UrlDiscovery::new("not a url"), Err(PipelineError::Config(_))));
    }
}
