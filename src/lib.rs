mod bot;
mod config;
pub mod document;
mod error;
pub mod extract;
pub mod listing;
mod offer;
pub mod ranking;
pub mod report;
pub mod skills;

pub use bot::{collect_offers, Bot, DetailPages, Tabs};
pub use config::Config;
pub use error::{Error, Result};
pub use offer::{
    load_offers, read_offers, save_offers, write_offers, Offer, Salaries, SalaryBand, TechStack,
    NOT_AVAILABLE,
};
pub use ranking::{rank, score, Catalog, ScoredOffer};
pub use skills::{derive_vocabulary, parse_skills, skills_of, Selection};

pub fn init_logger(default_level: log::LevelFilter) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}
