use std::{
    process::{Child, Command, Stdio},
    sync::Arc,
    time::Duration,
};

use thirtyfour::{
    common::config::WebDriverConfig, extensions::query::ElementPollerWithTimeout, prelude::*,
    AlertBehaviour, WindowHandle,
};
use tiny_bail::prelude::*;
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    extract::parse_offer,
    listing::{parse_cards, Card, Discoverer, DiscoveryState, Listing, ListingSurface, Operator},
    offer::{save_offers, Offer},
};

/// Rendered once the listing page has offers to scroll through.
const LISTING_READY: &str = "a.offer-card";
/// Rendered once an offer's detail page can be read.
const DETAIL_READY: &str = "h1";

/// Offer detail pages, read one at a time.
#[allow(async_fn_in_trait)]
pub trait DetailPages {
    /// Returns the page's HTML once it is ready to be read.
    async fn read(&mut self, url: &Url) -> Result<String>;
}

/// A browser that can read pages in tabs of their own.
#[allow(async_fn_in_trait)]
pub trait Tabs {
    type Tab;

    async fn current_tab(&mut self) -> Result<Self::Tab>;
    /// Opens a blank tab without focusing it.
    async fn open_tab(&mut self) -> Result<Self::Tab>;
    async fn focus(&mut self, tab: &Self::Tab) -> Result<()>;
    async fn close_current(&mut self) -> Result<()>;
    /// Loads a page in the focused tab and returns its HTML once ready.
    async fn load(&mut self, url: &Url) -> Result<String>;
}

/// Each page gets a fresh tab, which is closed whether or not the page
/// loaded. Focus always returns to the tab that was current before.
impl<T: Tabs> DetailPages for T {
    async fn read(&mut self, url: &Url) -> Result<String> {
        let home = self.current_tab().await?;
        let tab = self.open_tab().await?;
        let page = match self.focus(&tab).await {
            Ok(()) => {
                let page = self.load(url).await;
                if let Err(e) = self.close_current().await {
                    log::warn!("Failed to close the tab for {}: {}", url, e);
                }
                page
            }
            // Closing needs focus, so an unfocusable tab stays open.
            Err(e) => Err(e),
        };
        self.focus(&home).await?;
        page
    }
}

impl ListingSurface for WebDriver {
    async fn scroll_by(&mut self, dy: i64) -> Result<()> {
        self.execute(format!("window.scrollBy(0, {});", dy), Vec::new())
            .await?;
        Ok(())
    }

    async fn cards(&mut self) -> Result<Vec<Card>> {
        Ok(parse_cards(&self.source().await?))
    }
}

impl Tabs for WebDriver {
    type Tab = WindowHandle;

    async fn current_tab(&mut self) -> Result<WindowHandle> {
        Ok(self.window().await?)
    }

    async fn open_tab(&mut self) -> Result<WindowHandle> {
        Ok(self.new_tab().await?)
    }

    async fn focus(&mut self, tab: &WindowHandle) -> Result<()> {
        Ok(self.switch_to_window(tab.clone()).await?)
    }

    async fn close_current(&mut self) -> Result<()> {
        Ok(self.close_window().await?)
    }

    async fn load(&mut self, url: &Url) -> Result<String> {
        self.goto(url.as_str()).await?;
        self.query(By::Css(DETAIL_READY)).first().await?;
        Ok(self.source().await?)
    }
}

/// Reads and extracts each listed offer in turn, numbering them from 1 in
/// listing order. Offers that fail to load or extract are logged and skipped.
pub async fn collect_offers(
    pages: &mut impl DetailPages,
    site: &Url,
    listings: &[Listing],
    limit: Option<usize>,
) -> Vec<Offer> {
    let mut offers = Vec::with_capacity(listings.len());
    for (listing, id) in listings.iter().take(limit.unwrap_or(usize::MAX)).zip(1..) {
        let url = c!(site.join(&listing.href));
        let page = match pages.read(&url).await {
            Ok(page) => page,
            Err(e) => {
                log::error!("[offer {}] Failed to load {}: {}", id, url, e);
                continue;
            }
        };
        match parse_offer(&page, id, url) {
            Ok(offer) => {
                log::info!("[offer {}] {}", id, offer);
                offers.push(offer);
            }
            Err(e) => log::error!("[offer {}] Failed to extract {}: {}", id, listing.href, e),
        }
    }
    offers
}

#[derive(Default)]
pub struct Bot {
    server: Option<Child>,
    pub driver: Option<WebDriver>,
    pub config: Config,
    pub offers: Vec<Offer>,
}

impl Bot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_config(&mut self) -> Result<()> {
        self.config = Config::load(Config::FILE_PATH)?;
        Ok(())
    }

    pub async fn init(&mut self) -> Result<()> {
        assert!(self.server.is_none() && self.driver.is_none());

        // Spawn WebDriver server as a child process.
        let server = Command::new(&self.config.driver_command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Connect to WebDriver server.
        let mut caps = DesiredCapabilities::firefox();
        if self.config.headless {
            caps.set_headless()?;
        }
        caps.set_unexpected_alert_behaviour(AlertBehaviour::Dismiss)?;
        let config = WebDriverConfig::builder()
            .poller(Arc::new(ElementPollerWithTimeout::new(
                Duration::from_secs(8),
                Duration::from_millis(100),
            )))
            .build()?;
        let driver = WebDriver::new_with_config(self.config.webdriver.as_str(), caps, config).await?;

        self.server = Some(server);
        self.driver = Some(driver);

        Ok(())
    }

    pub async fn quit(mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
        }
        if let Some(mut server) = self.server.take() {
            server.kill()?;
        }
        Ok(())
    }

    /// Discovers offers on the listing page and scrapes each one.
    ///
    /// Returns false if the operator aborted, in which case nothing was scraped.
    pub async fn scrape(&mut self, operator: &mut impl Operator) -> Result<bool> {
        let site = self.config.site_url()?;
        let listing = self.config.listing_url()?;
        let driver = self.driver.as_mut().ok_or(Error::NotConnected)?;

        log::info!("[listing] {}", listing);
        driver.goto(listing.as_str()).await?;
        driver.query(By::Css(LISTING_READY)).first().await?;

        let mut discoverer = Discoverer::new(self.config.pacing());
        if discoverer.run(driver, operator).await? == DiscoveryState::Aborted {
            log::info!("[listing] Stopped by operator, nothing saved");
            return Ok(false);
        }
        let listings = discoverer.into_listings();

        log::info!("Scraping {} offers...", listings.len());
        self.offers = collect_offers(driver, &site, &listings, self.config.limit).await;
        log::info!("Scraped {} of {} offers", self.offers.len(), listings.len());
        Ok(true)
    }

    /// Writes the scraped offers, keeping the previous export as a backup.
    pub fn save(&self) -> Result<()> {
        let path = &self.config.output;
        if path.exists() {
            let backup = path.with_extension("csv.backup");
            if let Err(e) = std::fs::copy(path, &backup) {
                log::warn!("Failed to back up {}: {}", path.display(), e);
            }
        }
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        save_offers(path, &self.offers)?;
        log::info!("Saved {} offers to {}", self.offers.len(), path.display());
        Ok(())
    }
}
