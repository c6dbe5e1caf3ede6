use crate::config::Config;
use crate::constants::{NPM_MUSEUM_NAME, NPM_SOURCE};
use crate::error::Result;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.npm.gov.tw";
const LISTING_URL: &str = "https://www.npm.gov.tw/Exhibition-Current.aspx?l=1";

/// The palace museum splits its programme into 常設展 and 特展 blocks; the
/// block a card sits in becomes the record's category.
pub struct NpmCrawler {
    fetcher: RetryingFetcher,
}

impl NpmCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
        }
    }

    /// Discovery keeps the category alongside each link.
    fn discover_links(listing_html: &str) -> Vec<(String, String)> {
        let document = Html::parse_document(listing_html);
        let section_selector = Selector::parse("section.exhibition-group").unwrap();
        let heading_selector = Selector::parse("h2.group-name").unwrap();
        let card_selector = Selector::parse("div.exhibition-item > a").unwrap();

        let mut links = Vec::new();
        for section in document.select(&section_selector) {
            let category = section
                .select(&heading_selector)
                .next()
                .map(|h| h.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            for card in section.select(&card_selector) {
                let href = card.value().attr("href").unwrap_or_default();
                let link = resolve_url(BASE_URL, href);
                if is_absolute_http(&link) {
                    links.push((link, category.clone()));
                }
            }
        }
        links
    }

    fn parse_detail(html: &str, link: &str, category: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("h3.exh-title").unwrap();
        let subtitle_selector = Selector::parse("div.exh-subtitle").unwrap();
        let date_selector = Selector::parse("span.exh-date").unwrap();
        let place_selector = Selector::parse("li.exh-place").unwrap();
        let image_selector = Selector::parse("div.exh-banner img").unwrap();

        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let topic = document
            .select(&subtitle_selector)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let dates: Vec<String> = document
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();

        let location = document
            .select(&place_selector)
            .next()
            .map(|p| p.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        Some(json!({
            "museum": NPM_MUSEUM_NAME,
            "title": title,
            "topic": topic,
            "date": join_date_fragments(&dates),
            "url": link,
            "image_url": image_url,
            "location": location,
            "category": category,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for NpmCrawler {
    fn source_name(&self) -> &'static str {
        NPM_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        NPM_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        let listing = match self.fetcher.fetch(LISTING_URL).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch NPM listing: {}", e);
                return Ok(harvest);
            }
        };

        let links = Self::discover_links(&listing);
        harvest.discovered = links.len();
        if links.is_empty() {
            warn!("No exhibition links found - the listing structure may have changed");
        }

        for (link, category) in links {
            let body = match self.fetcher.fetch(&link).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Skipping {}: {}", link, e);
                    harvest.skip();
                    continue;
                }
            };
            match Self::parse_detail(&body, &link, &category) {
                Some(raw) => harvest.push(raw),
                None => {
                    warn!("Skipping {}: detail page did not parse", link);
                    harvest.skip();
                }
            }
        }

        info!("Parsed {} exhibitions from NPM", harvest.records.len());
        Ok(harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <section class="exhibition-group">
          <h2 class="group-name">特展</h2>
          <div class="exhibition-item"><a href="/Exhibition-Content.aspx?sno=1">甲</a></div>
          <div class="exhibition-item"><a href="/Exhibition-Content.aspx?sno=2">乙</a></div>
        </section>
        <section class="exhibition-group">
          <h2 class="group-name">常設展</h2>
          <div class="exhibition-item"><a href="/Exhibition-Content.aspx?sno=3">丙</a></div>
        </section>"#;

    #[test]
    fn discovery_pairs_links_with_section_category() {
        let links = NpmCrawler::discover_links(LISTING_HTML);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].1, "特展");
        assert_eq!(links[2].1, "常設展");
        assert!(links[0].0.starts_with("https://www.npm.gov.tw/Exhibition-Content.aspx"));
    }

    #[test]
    fn parses_detail_with_topic_and_category() {
        let html = r#"
            <h3 class="exh-title">翠玉白菜</h3>
            <div class="exh-subtitle">院藏精選</div>
            <span class="exh-date">2024/01/01</span>
            <span class="exh-date">2025/12/31</span>
            <ul><li class="exh-place">北部院區 第一展覽館</li></ul>
            <div class="exh-banner"><img src="/Upload/banner1.jpg"></div>"#;
        let raw = NpmCrawler::parse_detail(html, "https://www.npm.gov.tw/e/1", "常設展").unwrap();
        assert_eq!(raw["title"], "翠玉白菜");
        assert_eq!(raw["topic"], "院藏精選");
        assert_eq!(raw["date"], "2024/01/01 - 2025/12/31");
        assert_eq!(raw["location"], "北部院區 第一展覽館");
        assert_eq!(raw["category"], "常設展");
        assert_eq!(raw["image_url"], "https://www.npm.gov.tw/Upload/banner1.jpg");
    }

    #[test]
    fn page_without_title_is_skipped() {
        assert!(NpmCrawler::parse_detail("<body></body>", "https://x.org", "").is_none());
    }
}
