use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::{error::Result, listing::Pacing};

/// Scraper settings, read from a RON file.
#[derive(Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The site root that offer links on the listing page are relative to.
    pub site: String,
    /// The listing page, filters included.
    pub listing: String,
    /// Command that starts the WebDriver server.
    pub driver_command: String,
    pub webdriver: String,
    pub headless: bool,
    /// Where the CSV export is written and read from.
    pub output: PathBuf,
    /// Pixels per scroll step.
    pub scroll_step: i64,
    pub poll_interval_ms: u64,
    /// How long scrolling may turn up nothing before asking the operator.
    pub window_ms: u64,
    /// Scrape at most this many detail pages.
    pub limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            site: "https://justjoin.it".to_string(),
            listing: "https://justjoin.it/job-offers/all-locations/data\
                      ?experience-level=junior,mid&with-salary=yes&orderBy=DESC&sortBy=published"
                .to_string(),
            driver_command: "geckodriver".to_string(),
            webdriver: "http://localhost:4444".to_string(),
            headless: true,
            output: PathBuf::from("data/justjoinit_offers.csv"),
            scroll_step: pacing.step,
            poll_interval_ms: pacing.poll.as_millis() as u64,
            window_ms: pacing.window.as_millis() as u64,
            limit: None,
        }
    }
}

impl Config {
    pub const FILE_PATH: &str = "data/scrape.ron";

    /// Reads a config file, falling back to defaults if there is none.
    ///
    /// Fails if `site` or `listing` is not an absolute URL.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(config_str) => {
                let config: Self = ron::from_str(&config_str)?;
                config.site_url()?;
                config.listing_url()?;
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn site_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.site)?)
    }

    pub fn listing_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.listing)?)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            step: self.scroll_step,
            poll: Duration::from_millis(self.poll_interval_ms),
            window: Duration::from_millis(self.window_ms),
        }
    }
}
