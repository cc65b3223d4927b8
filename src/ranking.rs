use std::collections::HashSet;

use crate::{
    offer::Offer,
    skills::{derive_vocabulary, skills_of, Selection},
};

/// How well a selection covers an offer's required skills.
///
/// The whole part counts the selected skills the offer requires; the
/// fraction is the share of the offer's requirements they cover, rounded to
/// two places. An offer that lists no skills scores 0.
pub fn score(selected: &HashSet<&str>, required: &[impl AsRef<str>]) -> f64 {
    if required.is_empty() {
        return 0.0;
    }
    let count = required
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<HashSet<&str>>()
        .intersection(selected)
        .count();
    let ratio = round_cents(count as f64 / required.len() as f64);
    count as f64 + ratio
}

/// Rounds the exact value of `x` to two decimal places. Only exact ties go
/// to even, so 0.025 (stored slightly above) rounds up but 0.125 rounds down.
fn round_cents(x: f64) -> f64 {
    format!("{:.2}", x).parse().unwrap_or(x)
}

#[derive(Clone, Copy, Debug)]
pub struct ScoredOffer<'a> {
    pub offer: &'a Offer,
    pub match_score: f64,
}

/// Scores every offer, drops those scoring 0, and sorts best first.
///
/// Offers with equal scores keep their dataset order. An empty selection
/// matches nothing.
pub fn rank<'a>(offers: &'a [Offer], selection: &Selection) -> Vec<ScoredOffer<'a>> {
    rank_with(
        offers.iter().map(|offer| (offer, skills_of(offer))),
        selection,
    )
}

fn rank_with<'a, S: AsRef<[String]>>(
    offers: impl IntoIterator<Item = (&'a Offer, S)>,
    selection: &Selection,
) -> Vec<ScoredOffer<'a>> {
    if selection.is_empty() {
        return Vec::new();
    }
    let selected = selection.as_set();
    let mut scored: Vec<_> = offers
        .into_iter()
        .map(|(offer, skills)| ScoredOffer {
            offer,
            match_score: score(&selected, skills.as_ref()),
        })
        .filter(|scored| scored.match_score > 0.0)
        .collect();
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    scored
}

/// A loaded dataset with each offer's skills parsed once.
#[derive(Debug)]
pub struct Catalog {
    offers: Vec<Offer>,
    skills: Vec<Vec<String>>,
    vocabulary: Vec<String>,
}

impl Catalog {
    pub fn new(offers: Vec<Offer>) -> Self {
        let skills = offers.iter().map(skills_of).collect();
        let vocabulary = derive_vocabulary(&offers);
        Self {
            offers,
            skills,
            vocabulary,
        }
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Every known skill, sorted.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn rank(&self, selection: &Selection) -> Vec<ScoredOffer<'_>> {
        rank_with(self.offers.iter().zip(&self.skills), selection)
    }
}
