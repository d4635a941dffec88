//! Styled threshold sweep table

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::selection::{ThresholdRow, ThresholdTable};

type Metric = (&'static str, fn(&ThresholdRow) -> f64);

const METRICS: [Metric; 5] = [
    ("Precision", |r| r.precision),
    ("Recall", |r| r.recall),
    ("F1", |r| r.f1),
    ("Accuracy", |r| r.accuracy),
    ("AUC", |r| r.auc),
];

/// Build the table, highlighting the best value in each metric column
pub fn threshold_table(table: &ThresholdTable) -> Table {
    let best: Vec<f64> = METRICS
        .iter()
        .map(|(_, get)| {
            table
                .rows()
                .iter()
                .map(get)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();

    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("Threshold").add_attribute(Attribute::Bold)];
    header.extend(
        METRICS
            .iter()
            .map(|(name, _)| Cell::new(name).add_attribute(Attribute::Bold)),
    );
    out.set_header(header);

    for row in table.rows() {
        let mut cells = vec![Cell::new(format!("{:.2}", row.threshold))];
        for ((_, get), &top) in METRICS.iter().zip(best.iter()) {
            let value = get(row);
            let cell = Cell::new(format!("{:.2}", value)).set_alignment(CellAlignment::Right);
            cells.push(if value == top {
                cell.fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                cell
            });
        }
        out.add_row(cells);
    }

    out
}

pub fn display_threshold_table(table: &ThresholdTable) {
    println!();
    println!(
        "    {} {}",
        style("📈").cyan(),
        style("THRESHOLD SWEEP").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in threshold_table(table).to_string().lines() {
        println!("    {}", line);
    }

    if let Some(best) = table.best_f1() {
        println!();
        println!(
            "      Best F1 {} at threshold {}",
            style(format!("{:.2}", best.f1)).green().bold(),
            style(format!("{:.2}", best.threshold)).yellow()
        );
    }
}
