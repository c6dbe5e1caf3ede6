use crate::config::Config;
use crate::constants::{TFAM_MUSEUM_NAME, TFAM_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.tfam.museum";
const LISTING_URL: &str = "https://www.tfam.museum/Exhibition/Exhibition.aspx?ddlLang=zh-tw";

pub struct TfamCrawler {
    fetcher: RetryingFetcher,
}

impl TfamCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    fn discover_links(listing_html: &str) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let link_selector = Selector::parse("ul#exhibitionList li a.item-link").unwrap();

        document
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_url(BASE_URL, href))
            .filter(|link| is_absolute_http(link))
            .collect()
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let header_selector = Selector::parse("div.exh-header").unwrap();
        let title_selector = Selector::parse("h2").unwrap();
        let subtitle_selector = Selector::parse("p.subtitle").unwrap();
        let date_selector = Selector::parse("span.date-item").unwrap();
        let gallery_selector = Selector::parse("span.gallery").unwrap();
        let image_selector = Selector::parse("div.exh-visual img").unwrap();

        // All text fields hang off the exhibition header block.
        let header = document.select(&header_selector).next()?;
        let title = header
            .select(&title_selector)
            .next()?
            .text()
            .collect::<String>()
            .trim()
            .to_string();

        let topic = header
            .select(&subtitle_selector)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let dates: Vec<String> = header
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();

        let location = header
            .select(&gallery_selector)
            .next()
            .map(|g| g.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        Some(json!({
            "museum": TFAM_MUSEUM_NAME,
            "title": title,
            "topic": topic,
            "date": join_date_fragments(&dates),
            "url": link,
            "image_url": image_url,
            "location": location,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for TfamCrawler {
    fn source_name(&self) -> &'static str {
        TFAM_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        TFAM_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch TFAM listing: {}", e);
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

        info!("Parsed {} exhibitions from TFAM", harvest.records.len());
        Ok(harvest)
    }
}
