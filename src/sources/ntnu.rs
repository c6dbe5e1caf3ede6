use crate::config::Config;
use crate::constants::{NTNU_MUSEUM_NAME, NTNU_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.artmuseum.ntnu.edu.tw";
const LISTING_URL: &str = "https://www.artmuseum.ntnu.edu.tw/exhibition/";

/// The university museum mixes exhibitions into a general post list, so
/// discovery keeps only addresses under the exhibition path.
pub struct NtnuCrawler {
    fetcher: RetryingFetcher,
}

impl NtnuCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    fn discover_links(listing_html: &str) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let link_selector = Selector::parse("div.post-list a.post-link").unwrap();

        document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(BASE_URL, href))
            .filter(|link| is_absolute_http(link) && link.contains("/exhibition/"))
            .collect()
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("h3.post-title").unwrap();
        let date_selector = Selector::parse("span.post-date").unwrap();
        let image_selector = Selector::parse("div.post-content img").unwrap();

        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let dates: Vec<String> = document
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        Some(json!({
            "museum": NTNU_MUSEUM_NAME,
            "title": title,
            "date": join_date_fragments(&dates),
            "url": link,
            "image_url": image_url,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for NtnuCrawler {
    fn source_name(&self) -> &'static str {
        NTNU_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        NTNU_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch NTNU listing: {}", e);
                return Ok(harvest);
            }
        };

        let links = Self::discover_links(&listing);
        harvest.discovered = links.len();
        if links.is_empty() {
            warn!("No exhibition links found - the listing structure may have changed");
        }

        for link in links {
            let body = match self.fetcher.fetch(&link).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping {}: {}", link, e);
                    harvest.skip();
                    continue;
                }
            };
            match Self::parse_detail(&body, &link) {
                Some(raw) => harvest.push(raw),
                None => {
                    warn!("Skipping {}: detail page did not parse", link);
                    harvest.skip();
                }
            }
        }

        info!("Parsed {} exhibitions from NTNU", harvest.records.len());
        Ok(harvest)
    }
}
