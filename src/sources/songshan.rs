use crate::config::Config;
use crate::constants::{SONGSHAN_MUSEUM_NAME, SONGSHAN_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, numeric_time, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.songshanculturalpark.org";
const LISTING_URL: &str = "https://www.songshanculturalpark.org/exhibition";

pub struct SongshanCrawler {
    fetcher: RetryingFetcher,
}

impl SongshanCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    fn discover_links(listing_html: &str) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let link_selector = Selector::parse("ul.exhibition-list li a.exhibition-link").unwrap();

        document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(BASE_URL, href))
            .filter(|link| is_absolute_http(link))
            .collect()
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("h2.page-title").unwrap();
        let date_selector = Selector::parse("div.date-box span.date").unwrap();
        let venue_selector = Selector::parse("div.info a.venue").unwrap();
        let time_selector = Selector::parse("div.info span.open-time").unwrap();
        let image_selector = Selector::parse("div.kv img").unwrap();

        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let dates: Vec<String> = document
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();

        let location = document
            .select(&venue_selector)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let time = document
            .select(&time_selector)
            .next()
            .map(|node| numeric_time(node.text().collect::<String>().trim()))
            .unwrap_or_default();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        Some(json!({
            "museum": SONGSHAN_MUSEUM_NAME,
            "title": title,
            "date": join_date_fragments(&dates),
            "url": link,
            "image_url": image_url,
            "location": location,
            "time": time,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for SongshanCrawler {
    fn source_name(&self) -> &'static str {
        SONGSHAN_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        SONGSHAN_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch Songshan listing: {}", e);
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

        info!("Parsed {} exhibitions from Songshan", harvest.records.len());
        Ok(harvest)
    }
}
