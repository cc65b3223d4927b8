//! Discovery of offers on an infinitely scrolling listing page.
//!
//! The page only renders the cards around the viewport, and offers load as
//! the page is scrolled. There is no reliable end-of-list signal, so when a
//! scroll window turns up nothing new the operator decides whether to keep
//! going, save what was found, or give up.

use std::{
    collections::HashSet,
    io::{self, BufRead, Write},
    time::Duration,
};

use scraper::Html;
use tiny_bail::prelude::*;
use tokio::time::{sleep, Instant};

use crate::{document::Node, error::Result};

const CARD: &str = "div[data-index]";
const CARD_INDEX: &str = "data-index";
const CARD_LINK: &str = "a.offer-card";

/// An offer card as currently rendered on the listing page.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Card {
    pub index: String,
    pub href: Option<String>,
}

/// A discovered offer link.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Listing {
    pub index: String,
    pub href: String,
}

pub fn parse_cards(page_html: &str) -> Vec<Card> {
    let doc = Html::parse_document(page_html);
    cards_in(&doc.root_element())
}

pub fn cards_in<N: Node>(root: &N) -> Vec<Card> {
    let mut cards = Vec::new();
    for card in root.select_all(CARD) {
        let index = cq!(card
            .attribute(CARD_INDEX)
            .filter(|index| !index.trim().is_empty()));
        let href = card.first(CARD_LINK).and_then(|link| link.attribute("href"));
        cards.push(Card { index, href });
    }
    cards
}

/// A live listing page that loads more cards as it scrolls.
#[allow(async_fn_in_trait)]
pub trait ListingSurface {
    async fn scroll_by(&mut self, dy: i64) -> Result<()>;
    async fn cards(&mut self) -> Result<Vec<Card>>;
}

#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    /// Pixels per scroll.
    pub step: i64,
    /// Pause after each scroll for new cards to render.
    pub poll: Duration,
    /// How long to keep scrolling before declaring the list exhausted.
    pub window: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step: 200,
            poll: Duration::from_millis(500),
            window: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DiscoveryState {
    Scrolling,
    /// A scroll window found nothing new; waiting on the operator.
    Exhausted,
    /// Discovery stopped and the listings should be scraped and saved.
    Saving,
    /// Discovery stopped and nothing should be saved.
    Aborted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Continue,
    Save,
    Abort,
}

/// Decides what happens when the listing stops yielding new offers.
pub trait Operator {
    fn decide(&mut self, discoverer: &Discoverer) -> Decision;
}

impl<F: FnMut(&Discoverer) -> Decision> Operator for F {
    fn decide(&mut self, discoverer: &Discoverer) -> Decision {
        self(discoverer)
    }
}

/// Asks on a terminal.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self) -> io::Result<Option<Decision>> {
        write!(
            self.output,
            "Enter your choice:\n\
             [C] to continue scrolling,\n\
             [S] to save the data to a CSV file,\n\
             [Q] to quit the program.\n\
             Your choice: ",
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            log::warn!("[listing] Input closed, saving what was found");
            return Ok(Some(Decision::Save));
        }
        Ok(match line.trim().to_lowercase().as_str() {
            "c" => Some(Decision::Continue),
            "s" => Some(Decision::Save),
            "q" => Some(Decision::Abort),
            _ => None,
        })
    }
}

impl<R: BufRead, W: Write> Operator for Prompt<R, W> {
    fn decide(&mut self, discoverer: &Discoverer) -> Decision {
        writeln!(
            self.output,
            "No more new offers found ({} so far).",
            discoverer.listings().len(),
        )
        .ok();
        loop {
            match self.ask() {
                Ok(Some(decision)) => return decision,
                Ok(None) => {
                    writeln!(self.output, "Invalid choice. Please enter 'C', 'S', or 'Q'.").ok();
                }
                Err(e) => {
                    log::error!("[listing] Failed to read choice: {}", e);
                    return Decision::Save;
                }
            }
        }
    }
}

/// Collects offer links from a listing page, each offer once.
pub struct Discoverer {
    pacing: Pacing,
    state: DiscoveryState,
    seen: HashSet<String>,
    listings: Vec<Listing>,
}

impl Discoverer {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            state: DiscoveryState::Scrolling,
            seen: HashSet::new(),
            listings: Vec::new(),
        }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    /// Links in discovery order.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn into_listings(self) -> Vec<Listing> {
        self.listings
    }

    /// Scrolls until the operator stops discovery, returning `Saving` or `Aborted`.
    pub async fn run(
        &mut self,
        surface: &mut impl ListingSurface,
        operator: &mut impl Operator,
    ) -> Result<DiscoveryState> {
        loop {
            match self.state {
                DiscoveryState::Scrolling => {
                    let has_new = self.wait_for_new(surface).await?;
                    let added = self.harvest(surface.cards().await?);
                    log::info!(
                        "[listing] Found {} new offers ({} total)",
                        added,
                        self.listings.len(),
                    );
                    if !has_new || added == 0 {
                        self.state = DiscoveryState::Exhausted;
                    }
                }
                DiscoveryState::Exhausted => {
                    log::info!("[listing] No more new offers found");
                    self.state = match operator.decide(self) {
                        Decision::Continue => {
                            log::info!("[listing] Continuing to scroll...");
                            DiscoveryState::Scrolling
                        }
                        Decision::Save => DiscoveryState::Saving,
                        Decision::Abort => DiscoveryState::Aborted,
                    };
                }
                DiscoveryState::Saving | DiscoveryState::Aborted => return Ok(self.state),
            }
        }
    }

    /// Scrolls until an unseen card renders or the window runs out.
    async fn wait_for_new(&self, surface: &mut impl ListingSurface) -> Result<bool> {
        let start = Instant::now();
        while start.elapsed() < self.pacing.window {
            surface.scroll_by(self.pacing.step).await?;
            sleep(self.pacing.poll).await;
            let cards = surface.cards().await?;
            if cards.iter().any(|card| !self.seen.contains(&card.index)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Records unseen cards. A card without a link is marked seen but yields nothing.
    fn harvest(&mut self, cards: Vec<Card>) -> usize {
        let mut added = 0;
        for card in cards {
            cq!(self.seen.insert(card.index.clone()));
            let href = c!(card.href);
            self.listings.push(Listing {
                index: card.index,
                href,
            });
            added += 1;
        }
        added
    }
}
