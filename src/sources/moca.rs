use crate::config::Config;
use crate::constants::{MOCA_MUSEUM_NAME, MOCA_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, numeric_time, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.mocataipei.org.tw";
const LISTING_URL: &str = "https://www.mocataipei.org.tw/tw/ExhibitionAndEvent";

pub struct MocaCrawler {
    fetcher: RetryingFetcher,
}

impl MocaCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    fn discover_links(listing_html: &str) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let card_selector = Selector::parse("div.listFrameBox a.frame-link").unwrap();

        document
            .select(&card_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(BASE_URL, href))
            .filter(|link| is_absolute_http(link))
            .collect()
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("h1.article-name").unwrap();
        let date_selector = Selector::parse("div.dateBox span").unwrap();
        let tag_selector = Selector::parse("div.tagBox span.tag").unwrap();
        let image_selector = Selector::parse("div.mainPic img").unwrap();
        let time_selector = Selector::parse("div.visitInfo span.hours").unwrap();

        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let dates: Vec<String> = document
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();

        let category = document
            .select(&tag_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        let time = document
            .select(&time_selector)
            .next()
            .map(|node| numeric_time(node.text().collect::<String>().trim()))
            .unwrap_or_default();

        Some(json!({
            "museum": MOCA_MUSEUM_NAME,
            "title": title,
            "date": join_date_fragments(&dates),
            "url": link,
            "image_url": image_url,
            "time": time,
            "category": category,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for MocaCrawler {
    fn source_name(&self) -> &'static str {
        MOCA_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        MOCA_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch MOCA listing: {}", e);
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

        info!("Parsed {} exhibitions from MOCA", harvest.records.len());
        Ok(harvest)
    }
}
