use std::io;

use offer_scout::{init_logger, load_offers, report, Catalog, Config, Selection};

/// Ranks the scraped offers against the skills given as arguments.
/// Without arguments, lists the skills that can be picked.
fn main() -> offer_scout::Result<()> {
    init_logger(log::LevelFilter::Info);
    let config = Config::load(Config::FILE_PATH)?;
    let catalog = Catalog::new(load_offers(&config.output)?);

    let mut selection = Selection::new();
    for skill in std::env::args().skip(1) {
        if !catalog.vocabulary().contains(&skill) {
            log::warn!("Unknown skill: {}", skill);
            continue;
        }
        selection.add(skill);
    }

    let mut out = io::stdout().lock();
    if selection.is_empty() {
        report::write_vocabulary(&mut out, catalog.vocabulary(), &selection)?;
    }
    report::write_ranked(&mut out, &catalog.rank(&selection), &selection)?;
    Ok(())
}
