//! Analysis orchestrator: detection → transactions → mining → rules.
//!
//! `analyze` is the single entry point composing the core stages. It never
//! lets an unanticipated failure escape as-is; anything that is not already
//! an [`AnalysisError`] is wrapped into [`AnalysisError::Failed`] so callers
//! always see a discriminated success/failure result.

use std::collections::BTreeSet;

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::{
    apriori::{self, LevelledItemsets},
    cli::AnalyzeArgs,
    detect,
    error::AnalysisError,
    export,
    frame::Frame,
    io_utils, render,
    rules::{self, Rule},
    transactions::{self, GroupingStrategy},
};

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    /// Inclusive minimum support for frequent itemsets, in [0, 1].
    pub min_support: f64,
    /// Inclusive minimum lift for emitted rules.
    pub min_lift: f64,
    /// Largest itemset size to mine; 0 means unlimited.
    pub max_len: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_support: 0.001,
            min_lift: 1.0,
            max_len: 0,
        }
    }
}

/// One frequent itemset, flattened out of its level for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct FrequentItemset {
    pub items: Vec<String>,
    pub length: usize,
    pub support: f64,
}

impl FrequentItemset {
    pub fn label(&self) -> String {
        self.items.join(", ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMeta {
    pub item_column: String,
    pub grouping_column: String,
    pub strategy: GroupingStrategy,
    pub list_mode: bool,
    pub n_transactions: usize,
    pub n_distinct_items: usize,
    pub min_support: f64,
    pub min_lift: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rules: Vec<Rule>,
    pub itemsets: Vec<FrequentItemset>,
    pub meta: AnalysisMeta,
}

/// Runs the full analysis over a frame.
///
/// A zero-row frame fails hard with [`AnalysisError::EmptyInput`]; a frame
/// that cleans down to zero transactions yields an empty success report.
pub fn analyze(frame: &Frame, options: &AnalysisOptions) -> Result<Report, AnalysisError> {
    match run(frame, options) {
        Ok(report) => Ok(report),
        Err(err) => Err(match err.downcast::<AnalysisError>() {
            Ok(typed) => typed,
            Err(other) => AnalysisError::Failed(other.to_string()),
        }),
    }
}

fn run(frame: &Frame, options: &AnalysisOptions) -> Result<Report> {
    if frame.n_rows() == 0 {
        return Err(AnalysisError::EmptyInput.into());
    }

    let detection = detect::detect(frame)?;
    let set = transactions::build(frame, &detection)?;

    let distinct_items: BTreeSet<&String> = set
        .transactions
        .iter()
        .flat_map(|t| t.items.iter())
        .collect();
    let meta = AnalysisMeta {
        item_column: set.item_column.clone(),
        grouping_column: set.grouping_column.clone(),
        strategy: set.strategy,
        list_mode: detection.list_mode(),
        n_transactions: set.transactions.len(),
        n_distinct_items: distinct_items.len(),
        min_support: options.min_support,
        min_lift: options.min_lift,
    };
    info!(
        "Built {} transaction(s) over {} distinct item(s) via {} grouping",
        meta.n_transactions, meta.n_distinct_items, meta.strategy
    );

    let frequents = apriori::mine(&set.transactions, options.min_support, options.max_len);
    let rules = rules::generate(&frequents, options.min_lift);
    let itemsets = flatten_itemsets(&frequents);
    info!(
        "Mined {} frequent itemset(s) and {} rule(s)",
        itemsets.len(),
        rules.len()
    );

    Ok(Report {
        rules,
        itemsets,
        meta,
    })
}

/// Flattens levelled itemsets into a list sorted by length ascending, then
/// support descending, then labels.
fn flatten_itemsets(frequents: &LevelledItemsets) -> Vec<FrequentItemset> {
    let mut flat = Vec::new();
    for (length, level) in frequents {
        for (itemset, support) in level {
            flat.push(FrequentItemset {
                items: itemset.iter().cloned().collect(),
                length: *length,
                support: *support,
            });
        }
    }
    flat.sort_by(|a, b| {
        a.length
            .cmp(&b.length)
            .then_with(|| b.support.total_cmp(&a.support))
            .then_with(|| a.items.cmp(&b.items))
    });
    flat
}

/// Renders a metric for display; infinite lift shows as `inf`.
pub fn format_metric(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        "inf".to_string()
    }
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter, encoding)?;
    info!(
        "Analyzing '{}' (min_support={}, min_lift={})",
        args.input.display(),
        args.min_support,
        args.min_lift
    );
    let frame = Frame::from_path(&args.input, delimiter, encoding)?;
    let options = AnalysisOptions {
        min_support: args.min_support,
        min_lift: args.min_lift,
        max_len: args.max_len,
    };
    let report = analyze(&frame, &options)?;

    print_meta(&report.meta);
    print_itemsets(&report.itemsets, args.top);
    print_rules(&report.rules, args.top);

    if let Some(dir) = &args.output {
        export::write_artifacts(&report, dir)?;
        info!("Wrote analysis artifacts to {:?}", dir);
    }
    Ok(())
}

fn print_meta(meta: &AnalysisMeta) {
    let headers = vec!["setting".to_string(), "value".to_string()];
    let rows = vec![
        vec!["item column".to_string(), meta.item_column.clone()],
        vec!["grouping column".to_string(), meta.grouping_column.clone()],
        vec!["grouping strategy".to_string(), meta.strategy.to_string()],
        vec!["list mode".to_string(), meta.list_mode.to_string()],
        vec!["transactions".to_string(), meta.n_transactions.to_string()],
        vec![
            "distinct items".to_string(),
            meta.n_distinct_items.to_string(),
        ],
    ];
    render::print_table(&headers, &rows);
    println!();
}

fn print_itemsets(itemsets: &[FrequentItemset], top: usize) {
    let headers = vec![
        "itemset".to_string(),
        "length".to_string(),
        "support".to_string(),
    ];
    let mut rows = itemsets
        .iter()
        .map(|itemset| {
            vec![
                itemset.label(),
                itemset.length.to_string(),
                format_metric(itemset.support),
            ]
        })
        .collect::<Vec<_>>();
    if top > 0 && rows.len() > top {
        rows.truncate(top);
    }
    render::print_table(&headers, &rows);
    println!();
}

fn print_rules(rules: &[Rule], top: usize) {
    let headers = vec![
        "antecedents".to_string(),
        "consequents".to_string(),
        "support".to_string(),
        "confidence".to_string(),
        "lift".to_string(),
    ];
    let mut rows = rules
        .iter()
        .map(|rule| {
            vec![
                rule.antecedent_label(),
                rule.consequent_label(),
                format_metric(rule.support),
                format_metric(rule.confidence),
                format_metric(rule.lift),
            ]
        })
        .collect::<Vec<_>>();
    if top > 0 && rows.len() > top {
        rows.truncate(top);
    }
    render::print_table(&headers, &rows);
}
