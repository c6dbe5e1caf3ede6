use crate::config::Config;
use crate::constants::{HUASHAN_MUSEUM_NAME, HUASHAN_SOURCE};
use crate::error::Result;
use crate::fetch::browser::RenderedSession;
use crate::fetch::RetryingFetcher;
use crate::sources::parse::{is_absolute_http, join_date_fragments, numeric_time, resolve_url};
use crate::types::{ExhibitionSource, RawExhibition, SourceHarvest};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::{info, instrument, warn};

const BASE_URL: &str = "https://www.huashan1914.com";
const LISTING_URL: &str = "https://www.huashan1914.com/w/huashan1914";

/// The current-exhibition wall is a script-driven carousel; only the active
/// slide carries the listing, so discovery needs a rendered session. Detail
/// pages are plain HTML and go through the retrying fetcher.
const SLIDE_MARKER: &str = ".swiper-slide.swiper-slide-active";

pub struct HuashanCrawler {
    fetcher: RetryingFetcher,
    browser_config: crate::config::BrowserConfig,
}

impl HuashanCrawler {
    pub fn new(config: &Config) -> Self {
        Self {
            fetcher: RetryingFetcher::new(&config.fetch),
            browser_config: config.browser.clone(),
        }
    }

    /// Pull exhibition detail links out of the active carousel slide. Each
    /// slide item carries its target page in an `onclick` handler rather
    /// than an anchor.
    fn discover_links(rendered_html: &str) -> Vec<String> {
        let document = Html::parse_document(rendered_html);
        let slide_selector = Selector::parse(".swiper-slide.swiper-slide-active").unwrap();
        let item_selector = Selector::parse("div > img").unwrap();
        let onclick_path = Regex::new(r"'(/[^']+)'").unwrap();

        let slide = match document.select(&slide_selector).next() {
            Some(slide) => slide,
            None => {
                warn!("Active slide not found - the carousel structure may have changed");
                return Vec::new();
            }
        };

        let mut links = Vec::new();
        for img in slide.select(&item_selector) {
            let onclick = img.value().attr("onclick").unwrap_or_default();
            if let Some(captures) = onclick_path.captures(onclick) {
                let link = resolve_url(BASE_URL, &captures[1]);
                if is_absolute_http(&link) {
                    links.push(link);
                }
            }
        }
        links
    }

    fn parse_detail(html: &str, link: &str) -> Option<RawExhibition> {
        let document = Html::parse_document(html);
        let title_selector = Selector::parse("div.article-title.page").unwrap();
        let date_selector = Selector::parse("div.card-date").unwrap();
        let time_selector = Selector::parse("div.card-time").unwrap();
        let image_selector = Selector::parse("span[rel] img").unwrap();
        let place_selector = Selector::parse("a.openMap").unwrap();

        // Without the article title block this is not an exhibition page.
        let title_node = document.select(&title_selector).next()?;
        let title = title_node.text().collect::<String>().trim().to_string();

        let dates: Vec<String> = document
            .select(&date_selector)
            .map(|d| d.text().collect::<String>().trim().to_string())
            .collect();
        let date = join_date_fragments(&dates);

        let time = document
            .select(&time_selector)
            .next()
            .map(|node| {
                let raw = node.text().collect::<Vec<_>>().join(" ");
                numeric_time(raw.trim())
            })
            .unwrap_or_default();

        let image_url = document
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| resolve_url(BASE_URL, src))
            .unwrap_or_default();

        let location = document
            .select(&place_selector)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Some(json!({
            "museum": HUASHAN_MUSEUM_NAME,
            "title": title,
            "date": date,
            "url": link,
            "image_url": image_url,
            "location": location,
            "time": time,
        }))
    }
}

#[async_trait::async_trait]
impl ExhibitionSource for HuashanCrawler {
    fn source_name(&self) -> &'static str {
        HUASHAN_SOURCE
    }

    fn museum_name(&self) -> &'static str {
        HUASHAN_MUSEUM_NAME
    }

    #[instrument(skip(self))]
    async fn harvest(&self) -> Result<SourceHarvest> {
        let mut harvest = SourceHarvest::empty();

        // Session scope: discovery only. Closed before the per-item fetches
        // regardless of what discovery finds.
        let links = {
            let session = match RenderedSession::open(&self.browser_config).await {
                Some(session) => session,
                None => {
                    warn!("Rendered session unavailable, skipping Huashan");
                    return Ok(harvest);
                }
            };
            let links = match session.load(LISTING_URL, SLIDE_MARKER).await {
                Ok(rendered) => Self::discover_links(&rendered),
                Err(e) => {
                    warn!("Failed to render Huashan listing: {}", e);
                    Vec::new()
                }
            };
            session.close().await;
            links
        };

        harvest.discovered = links.len();
        info!("Discovered {} exhibitions from Huashan carousel", links.len());

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

        info!("Parsed {} exhibitions from Huashan", harvest.records.len());
        Ok(harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <div class="swiper">
          <div class="swiper-slide"><div><img onclick="location.href='/w/huashan1914/stale-111'"></div></div>
          <div class="swiper-slide swiper-slide-active">
            <div><img onclick="location.href='/w/huashan1914/exhibition-111'"></div>
            <div><img onclick="openWin('/w/huashan1914/exhibition-222')"></div>
            <div><img alt="no handler"></div>
            <div><img onclick="doSomethingElse()"></div>
          </div>
        </div>"#;

    const DETAIL_HTML: &str = r#"
        <div class="article-title page"> 測試特展 </div>
        <div class="card-date">2024/01/01</div>
        <div class="card-date">2024/03/01</div>
        <div class="card-date">2024/05/01</div>
        <div class="card-time">10:00-18:00</div>
        <span rel="lightbox"><img src="/images/封面 圖.jpg"></span>
        <a class="openMap">中4B館</a>"#;

    #[test]
    fn discovers_links_from_active_slide_only() {
        let links = HuashanCrawler::discover_links(LISTING_HTML);
        assert_eq!(
            links,
            vec![
                "https://www.huashan1914.com/w/huashan1914/exhibition-111".to_string(),
                "https://www.huashan1914.com/w/huashan1914/exhibition-222".to_string(),
            ]
        );
    }

    #[test]
    fn missing_active_slide_yields_no_links() {
        let links = HuashanCrawler::discover_links("<div class=\"swiper-slide\"></div>");
        assert!(links.is_empty());
    }

    #[test]
    fn parses_detail_fields() {
        let raw = HuashanCrawler::parse_detail(
            DETAIL_HTML,
            "https://www.huashan1914.com/w/huashan1914/exhibition-111",
        )
        .unwrap();

        assert_eq!(raw["museum"], HUASHAN_MUSEUM_NAME);
        assert_eq!(raw["title"], "測試特展");
        assert_eq!(raw["date"], "2024/01/01 - 2024/03/01");
        assert_eq!(raw["time"], "10:00-18:00");
        assert_eq!(raw["location"], "中4B館");
        let image = raw["image_url"].as_str().unwrap();
        assert!(image.starts_with("https://www.huashan1914.com/images/"));
        assert!(!image.contains(' '));
    }

    #[test]
    fn placeholder_time_is_dropped() {
        let html = DETAIL_HTML.replace("10:00-18:00", "依公告");
        let raw = HuashanCrawler::parse_detail(&html, "https://example.org/x").unwrap();
        assert_eq!(raw["time"], "");
    }

    #[test]
    fn page_without_title_block_is_skipped() {
        assert!(HuashanCrawler::parse_detail("<div>not an exhibition</div>", "https://x.org").is_none());
    }
}
