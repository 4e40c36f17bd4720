//! Normalizes detected rows into a canonical transaction set.
//!
//! Handles both input shapes: "long" files (one row per purchased item) and
//! "list" files (one row per order, items packed into a delimited string).
//! Transaction identity follows a fixed precedence chain; the weakest link,
//! grouping five consecutive rows, is lossy and only used when nothing else
//! is available.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

use crate::{
    dates,
    detect::{Detection, ItemSource},
    error::AnalysisError,
    frame::Frame,
};

/// Rows grouped into one rolling transaction by the last-resort strategy.
const ROW_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub items: BTreeSet<String>,
}

/// How transaction ids were derived, in falling order of fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingStrategy {
    Order,
    CustomerDate,
    Customer,
    Date,
    RowWindow,
}

impl fmt::Display for GroupingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GroupingStrategy::Order => "order",
            GroupingStrategy::CustomerDate => "customer-date",
            GroupingStrategy::Customer => "customer",
            GroupingStrategy::Date => "date",
            GroupingStrategy::RowWindow => "row-window",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct TransactionSet {
    pub transactions: Vec<Transaction>,
    pub item_column: String,
    pub grouping_column: String,
    pub strategy: GroupingStrategy,
}

/// Builds the canonical transaction set for a frame and its detection
/// result. Items are trimmed; empty items, rows without a usable
/// transaction id, and repeated (id, item) pairs are dropped.
pub fn build(frame: &Frame, detection: &Detection) -> Result<TransactionSet, AnalysisError> {
    let item_idx = match detection.item {
        ItemSource::Column(idx) | ItemSource::ListColumn(idx) => idx,
    };
    if item_idx >= frame.n_cols() {
        return Err(AnalysisError::NoItemColumn);
    }

    let (strategy, grouping_column) = grouping_plan(frame, detection);

    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut logical_row = 0usize;
    for row in 0..frame.n_rows() {
        for item in row_items(frame, detection, row, item_idx) {
            let index = logical_row;
            logical_row += 1;
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let Some(id) = transaction_id(frame, detection, strategy, row, index) else {
                continue;
            };
            groups.entry(id).or_default().insert(item.to_string());
        }
    }

    let transactions = groups
        .into_iter()
        .map(|(id, items)| Transaction { id, items })
        .collect();

    Ok(TransactionSet {
        transactions,
        item_column: frame.headers()[item_idx].clone(),
        grouping_column,
        strategy,
    })
}

fn grouping_plan(frame: &Frame, detection: &Detection) -> (GroupingStrategy, String) {
    let header = |idx: usize| frame.headers()[idx].clone();
    match (detection.order, detection.customer, detection.date) {
        (Some(order), _, _) => (GroupingStrategy::Order, header(order)),
        (None, Some(customer), Some(date)) => (
            GroupingStrategy::CustomerDate,
            format!("{}|{}", header(customer), header(date)),
        ),
        (None, Some(customer), None) => (GroupingStrategy::Customer, header(customer)),
        (None, None, Some(date)) => (GroupingStrategy::Date, header(date)),
        (None, None, None) => (GroupingStrategy::RowWindow, "row-window".to_string()),
    }
}

/// Items contributed by one physical row: the single cell in long mode, or
/// the cell split on runs of `,` `|` `;` in list mode.
fn row_items<'a>(
    frame: &'a Frame,
    detection: &Detection,
    row: usize,
    item_idx: usize,
) -> Vec<&'a str> {
    let cell = frame.cell(row, item_idx);
    match detection.item {
        ItemSource::Column(_) => vec![cell],
        ItemSource::ListColumn(_) => cell
            .split(['|', ',', ';'])
            .filter(|token| !token.trim().is_empty())
            .collect(),
    }
}

/// Derives the transaction id for one logical row, or `None` when the
/// grouping value is missing and the row must be dropped.
fn transaction_id(
    frame: &Frame,
    detection: &Detection,
    strategy: GroupingStrategy,
    row: usize,
    logical_row: usize,
) -> Option<String> {
    let cell = |idx: usize| frame.cell(row, idx).trim();
    match strategy {
        GroupingStrategy::Order => {
            let value = cell(detection.order?);
            (!value.is_empty()).then(|| value.to_string())
        }
        GroupingStrategy::CustomerDate => {
            let customer = cell(detection.customer?);
            let raw_date = cell(detection.date?);
            let day = dates::calendar_day(raw_date).unwrap_or_else(|| raw_date.to_string());
            Some(format!("{customer}|{day}"))
        }
        GroupingStrategy::Customer => {
            let value = cell(detection.customer?);
            (!value.is_empty()).then(|| value.to_string())
        }
        GroupingStrategy::Date => {
            let raw = cell(detection.date?);
            let day = dates::calendar_day(raw).unwrap_or_else(|| raw.to_string());
            (!day.is_empty()).then_some(day)
        }
        GroupingStrategy::RowWindow => Some((logical_row / ROW_WINDOW).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect;

    fn frame(headers: &[&str], rows: &[&[&str]]) -> Frame {
        Frame::from_rows(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .expect("frame")
    }

    fn build_from(headers: &[&str], rows: &[&[&str]]) -> TransactionSet {
        let frame = frame(headers, rows);
        let detection = detect::detect(&frame).expect("detection");
        build(&frame, &detection).expect("transactions")
    }

    fn items(set: &TransactionSet, id: &str) -> Vec<String> {
        set.transactions
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.items.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn order_column_groups_rows() {
        let set = build_from(
            &["order_id", "product"],
            &[
                &["O1", "milk"],
                &["O1", "bread"],
                &["O2", "milk"],
                &["O1", "milk"],
            ],
        );
        assert_eq!(set.strategy, GroupingStrategy::Order);
        assert_eq!(set.transactions.len(), 2);
        assert_eq!(items(&set, "O1"), vec!["bread", "milk"]);
        assert_eq!(items(&set, "O2"), vec!["milk"]);
    }

    #[test]
    fn list_mode_explodes_delimited_cells() {
        let set = build_from(
            &["order_id", "items"],
            &[&["O1", "milk, bread;eggs"], &["O2", "milk,,milk"]],
        );
        assert_eq!(items(&set, "O1"), vec!["bread", "eggs", "milk"]);
        assert_eq!(items(&set, "O2"), vec!["milk"]);
    }

    #[test]
    fn customer_and_date_combine_with_day_truncation() {
        let set = build_from(
            &["customer", "timestamp", "product"],
            &[
                &["alice", "2024-05-06 09:00:00", "milk"],
                &["alice", "2024-05-06 18:30:00", "bread"],
                &["alice", "2024-05-07 09:00:00", "milk"],
            ],
        );
        assert_eq!(set.strategy, GroupingStrategy::CustomerDate);
        assert_eq!(
            items(&set, "alice|2024-05-06"),
            vec!["bread", "milk"]
        );
        assert_eq!(items(&set, "alice|2024-05-07"), vec!["milk"]);
    }

    #[test]
    fn missing_customer_or_date_becomes_empty_segment() {
        let set = build_from(
            &["customer", "date", "product"],
            &[&["", "2024-05-06", "milk"], &["bob", "", "eggs"]],
        );
        assert_eq!(items(&set, "|2024-05-06"), vec!["milk"]);
        assert_eq!(items(&set, "bob|"), vec!["eggs"]);
    }

    #[test]
    fn date_only_grouping_uses_calendar_day() {
        let set = build_from(
            &["date", "product"],
            &[
                &["2024-05-06 09:00:00", "milk"],
                &["2024-05-06 22:00:00", "bread"],
                &["2024-05-07", "eggs"],
            ],
        );
        assert_eq!(set.strategy, GroupingStrategy::Date);
        assert_eq!(items(&set, "2024-05-06"), vec!["bread", "milk"]);
        assert_eq!(items(&set, "2024-05-07"), vec!["eggs"]);
    }

    #[test]
    fn row_window_fallback_groups_five_rows() {
        let rows: Vec<Vec<String>> = (0..7).map(|i| vec![format!("item{i}")]).collect();
        let frame = Frame::from_rows(vec!["weird".to_string()], rows).expect("frame");
        let detection = detect::detect(&frame).expect("detection");
        let set = build(&frame, &detection).expect("transactions");
        assert_eq!(set.strategy, GroupingStrategy::RowWindow);
        assert_eq!(set.transactions.len(), 2);
        assert_eq!(items(&set, "0").len(), 5);
        assert_eq!(items(&set, "1").len(), 2);
    }

    #[test]
    fn empty_items_and_missing_ids_are_dropped() {
        let set = build_from(
            &["order_id", "product"],
            &[
                &["O1", "  "],
                &["", "milk"],
                &["O1", "bread"],
            ],
        );
        assert_eq!(set.transactions.len(), 1);
        assert_eq!(items(&set, "O1"), vec!["bread"]);
    }
}
