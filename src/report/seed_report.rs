//! Random-state search summary

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::selection::RandomStateResult;

/// Seeds shown around the winner in the closest-ratio listing
const CLOSEST_SHOWN: usize = 5;

/// Summary table plus the seeds whose ratios sit nearest the mean
pub fn seed_summary_table(result: &RandomStateResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let tried = result.ratios.len() + result.skipped.len();
    table.add_row(vec![Cell::new("🎲 Seeds tried"), Cell::new(tried)]);
    table.add_row(vec![
        Cell::new("⏭️  Seeds skipped"),
        Cell::new(result.skipped.len()).fg(if result.skipped.is_empty() {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("📊 Mean test/train F1"),
        Cell::new(format!("{:.4}", result.mean_ratio)),
    ]);

    let selected_ratio = result
        .ratios
        .iter()
        .find(|(seed, _)| *seed == result.seed)
        .map(|(_, r)| *r)
        .unwrap_or(f64::NAN);
    table.add_row(vec![
        Cell::new("✅ Selected seed"),
        Cell::new(format!("{} (ratio {:.4})", result.seed, selected_ratio))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    table
}

/// `(seed, ratio)` pairs ordered by distance to the mean ratio
pub fn closest_seeds(result: &RandomStateResult, n: usize) -> Vec<(u64, f64)> {
    let mut ordered = result.ratios.clone();
    ordered.sort_by(|a, b| {
        let da = (a.1 - result.mean_ratio).abs();
        let db = (b.1 - result.mean_ratio).abs();
        da.total_cmp(&db).then(a.0.cmp(&b.0))
    });
    ordered.truncate(n);
    ordered
}

pub fn display_seed_summary(result: &RandomStateResult) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("SEED SEARCH SUMMARY").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in seed_summary_table(result).to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!("      {}:", style("Closest to the mean ratio").yellow());
    for (seed, ratio) in closest_seeds(result, CLOSEST_SHOWN) {
        println!(
            "        {} seed {:>4}  ratio {:.4}",
            style("•").dim(),
            seed,
            ratio
        );
    }
}
