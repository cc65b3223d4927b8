use std::io::{self, Write};

use colored::{Color, Colorize as _};

use crate::{
    offer::{SalaryBand, NOT_AVAILABLE},
    ranking::ScoredOffer,
    skills::Selection,
};

/// Lists the skills that can still be added to the selection.
pub fn write_vocabulary(
    out: &mut impl Write,
    vocabulary: &[String],
    selection: &Selection,
) -> io::Result<()> {
    let available = selection.available(vocabulary);
    if available.is_empty() {
        return writeln!(out, "No more skills to add.");
    }
    writeln!(out, "{} skills:", available.len())?;
    for skill in available {
        writeln!(out, "  {}", skill)?;
    }
    Ok(())
}

pub fn write_ranked(
    out: &mut impl Write,
    ranked: &[ScoredOffer],
    selection: &Selection,
) -> io::Result<()> {
    if selection.is_empty() {
        return writeln!(out, "No skills selected");
    }
    writeln!(
        out,
        "{} matches found for {}",
        ranked.len(),
        selection.iter().collect::<Vec<_>>().join(", ").bold(),
    )?;

    for scored in ranked {
        let offer = scored.offer;
        // Ugly code makes pretty colors.
        writeln!(
            out,
            "{} {} {} {} {}",
            format!("{:>5.2}", scored.match_score)
                .bold()
                .color(score_color(scored.match_score)),
            format!("#{:<4}", offer.id),
            format!("{:16}", clip(field(&offer.company), 16)),
            format!("{:48}", clip(&offer.title, 48)),
            field(&offer.location),
        )?;
        writeln!(out, "      {}", offer.url.as_str().italic())?;
        writeln!(
            out,
            "      Category: {} | Experience: {}",
            field(&offer.category),
            field(&offer.experience),
        )?;
        writeln!(
            out,
            "      Salary B2B: {} | Salary Permanent: {}",
            offer.salary.get(SalaryBand::B2b).unwrap_or(NOT_AVAILABLE),
            offer.salary.get(SalaryBand::Permanent).unwrap_or(NOT_AVAILABLE),
        )?;
        writeln!(out, "      Tech Stack: {}", offer.tech_stack)?;
    }
    Ok(())
}

/// Cyan when the selection covers the whole stack, green for at least half.
fn score_color(score: f64) -> Color {
    let coverage = score.fract();
    if coverage == 0.0 {
        Color::Cyan
    } else if coverage >= 0.5 {
        Color::Green
    } else {
        Color::Yellow
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
