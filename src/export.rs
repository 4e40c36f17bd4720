//! Downloadable artifacts for a finished analysis.
//!
//! Writes `rules.csv`, `frequent_itemsets.csv`, and `meta.json` into a
//! target directory. Antecedent/consequent sets render as comma-joined
//! labels; infinite lift becomes an empty CSV cell (and `null` in JSON via
//! serde_json's non-finite handling) so consumers never see a fake number.

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};

use crate::{analyze::Report, io_utils};

pub const RULES_FILE: &str = "rules.csv";
pub const ITEMSETS_FILE: &str = "frequent_itemsets.csv";
pub const META_FILE: &str = "meta.json";

pub fn write_artifacts(report: &Report, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Creating output directory {dir:?}"))?;
    write_rules(report, &dir.join(RULES_FILE))?;
    write_itemsets(report, &dir.join(ITEMSETS_FILE))?;
    write_meta(report, &dir.join(META_FILE))?;
    Ok(())
}

fn write_rules(report: &Report, path: &Path) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer.write_record(["antecedents", "consequents", "support", "confidence", "lift"])?;
    for rule in &report.rules {
        writer.write_record([
            rule.antecedent_label(),
            rule.consequent_label(),
            csv_metric(rule.support),
            csv_metric(rule.confidence),
            csv_metric(rule.lift),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Writing rules to {path:?}"))
}

fn write_itemsets(report: &Report, path: &Path) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer.write_record(["itemset", "length", "support"])?;
    for itemset in &report.itemsets {
        writer.write_record([
            itemset.label(),
            itemset.length.to_string(),
            csv_metric(itemset.support),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Writing frequent itemsets to {path:?}"))
}

fn write_meta(report: &Report, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating {path:?}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report.meta)
        .with_context(|| format!("Writing metadata to {path:?}"))
}

/// Metric cell for CSV output: six decimal places, empty when non-finite.
fn csv_metric(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.6}")
    } else {
        String::new()
    }
}
