use crate::config::Config;
use crate::constants::{FUBON_MUSEUM_NAME, FUBON_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, numeric_time, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.fubonartmuseum.org";
const LISTING_URL: &str = "https://www.fubonartmuseum.org/Exhibitions";

/// Fubon publishes a single period string per exhibition instead of separate
/// start/end blocks, and adds a free-form notice that lands in `extra`.
pub struct FubonCrawler {
    fetcher: RetryingFetcher,
}

impl FubonCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    fn discover_links(listing_html: &str) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let link_selector = Selector::parse("div.exh-list a.exh-card").unwrap();

        document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(BASE_URL, href))
            .filter(|link| is_absolute_http(link))
            .collect()
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("h2.exh-name").unwrap();
        let period_selector = Selector::parse("p.exh-period").unwrap();
        let hours_selector = Selector::parse("p.exh-hours").unwrap();
        let floor_selector = Selector::parse("p.exh-floor").unwrap();
        let cover_selector = Selector::parse("figure.exh-cover img").unwrap();
        let notice_selector = Selector::parse("div.exh-notice").unwrap();

        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let date = document
            .select(&period_selector)
            .next()
            .map(|p| p.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let time = document
            .select(&hours_selector)
            .next()
            .map(|p| numeric_time(p.text().collect::<String>().trim()))
            .unwrap_or_default();

        let location = document
            .select(&floor_selector)
            .next()
            .map(|p| p.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let image_url = document
            .select(&cover_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        let extra = document
            .select(&notice_selector)
            .next()
            .map(|n| n.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Some(json!({
            "museum": FUBON_MUSEUM_NAME,
            "title": title,
            "date": date,
            "url": link,
            "image_url": image_url,
            "location": location,
            "time": time,
            "extra": extra,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for FubonCrawler {
    fn source_name(&self) -> &'static str {
        FUBON_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        FUBON_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch Fubon listing: {}", e);
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

        info!("Parsed {} exhibitions from Fubon", harvest.records.len());
        Ok(harvest)
    }
}
