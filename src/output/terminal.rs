// Colored terminal output for predictions, recommendations and status.
//
// main.rs delegates all formatting here so the command handlers stay focused
// on loading artifacts and running the pipelines.

use colored::Colorize;

use crate::classify::pipeline::{Label, Prediction};
use crate::posters::PosterCard;
use crate::recommend::catalog::CatalogEntry;
use crate::recommend::resolver::MatchTier;
use crate::recommend::RecommendationSet;

/// Display a single spam prediction.
pub fn display_prediction(text: &str, prediction: &Prediction, explain: bool) {
    println!(
        "{}  {}",
        colorize_label(prediction.label),
        super::truncate_chars(text, 80).dimmed()
    );

    if explain {
        let normalized = if prediction.normalized.is_empty() {
            "(empty)".to_string()
        } else {
            prediction.normalized.clone()
        };
        println!("    Normalized: {}", normalized.dimmed());
        println!(
            "    Class: {}  Active features: {}",
            prediction.class, prediction.active_features
        );
    }
}

/// Display the message shown when a title query matches nothing.
pub fn display_no_match(query: &str) {
    println!(
        "{} No match found for \"{}\". Try a different spelling or run `sieve titles --search`.",
        "!".red().bold(),
        super::truncate_chars(query, 60)
    );
}

/// Display a ranked recommendation list, with posters when they were looked up.
pub fn display_recommendations(set: &RecommendationSet, posters: Option<&[PosterCard]>) {
    let how = match set.tier {
        MatchTier::Exact => "exact match".to_string(),
        MatchTier::Substring => "partial match".to_string(),
        MatchTier::Fuzzy { ratio } => format!("fuzzy match, {:.0}% similar", ratio * 100.0),
    };

    println!(
        "\n{}",
        format!("=== Because you picked \"{}\" ===", set.matched.title).bold()
    );
    println!("  {}", how.dimmed());
    println!();

    if set.recommendations.is_empty() {
        println!("  The catalog has nothing else to recommend.");
        return;
    }

    for (i, rec) in set.recommendations.iter().enumerate() {
        println!(
            "  {:>2}. {:<48} {}",
            i + 1,
            super::truncate_chars(&rec.title, 46),
            format!("{:.3}", rec.score).cyan()
        );

        if let Some(url) = posters
            .and_then(|cards| cards.get(i))
            .and_then(|card| card.poster_url.as_deref())
        {
            println!("      {}", url.dimmed());
        }
    }
    println!();
}

/// Display a page of catalog titles.
pub fn display_titles(entries: &[&CatalogEntry], total: usize) {
    if entries.is_empty() {
        println!("No titles matched.");
        return;
    }
    for entry in entries {
        println!("  {:>6}  {}", entry.index.to_string().dimmed(), entry.title);
    }
    if entries.len() < total {
        println!(
            "{}",
            format!("  ... showing {} of {} titles", entries.len(), total).dimmed()
        );
    }
}

/// Display which artifacts are present in the artifact directory.
pub fn display_inventory(dir: &std::path::Path, inventory: &[(&str, bool)]) {
    println!("\n{}", "=== Artifacts ===".bold());
    println!("  Directory: {}", dir.display());
    for (name, present) in inventory {
        let mark = if *present {
            "present".green()
        } else {
            "missing".red()
        };
        println!("  {:<18} {}", name, mark);
    }
}

/// Colorize a spam label.
fn colorize_label(label: Label) -> colored::ColoredString {
    match label {
        Label::Spam => label.to_string().red().bold(),
        Label::NotSpam => label.to_string().green().bold(),
    }
}
