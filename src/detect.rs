//! Column role detection over arbitrary headers.
//!
//! Real-world basket exports rarely agree on column naming, so each semantic
//! role (item, order, customer, date) carries a synonym list matched against
//! normalized header names. A separate list catches "list format" columns
//! where one row holds a whole order as a delimited item string.

use crate::{error::AnalysisError, frame::Frame};

pub const ITEM_SYNONYMS: &[&str] = &[
    "itemdescription",
    "item",
    "items",
    "product",
    "productname",
    "product_name",
    "producttitle",
    "sku",
    "description",
    "tag",
    "tags",
    "label",
    "category",
    "categories",
];

pub const ORDER_SYNONYMS: &[&str] = &[
    "order_id",
    "orderid",
    "order",
    "orderno",
    "invoice",
    "invoiceno",
    "invoicenumber",
    "receipt",
    "billno",
    "transaction",
    "transaction_id",
    "basket",
    "basketid",
    "single_transaction",
];

pub const CUSTOMER_SYNONYMS: &[&str] = &[
    "customer",
    "customerid",
    "customer_id",
    "member",
    "membernumber",
    "userid",
    "user",
    "buyer",
    "client",
    "account",
    "phone",
    "email",
];

pub const DATE_SYNONYMS: &[&str] = &[
    "date",
    "datetime",
    "timestamp",
    "time",
    "created_at",
    "order_date",
    "invoicedate",
];

pub const LIST_FORMAT_SYNONYMS: &[&str] = &[
    "items",
    "order_items",
    "products",
    "tags",
    "tag",
    "categories",
    "category",
];

/// Where item labels come from: a plain one-item-per-row column, or a
/// list-format column whose cells hold delimited item lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    Column(usize),
    ListColumn(usize),
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub item: ItemSource,
    pub order: Option<usize>,
    pub customer: Option<usize>,
    pub date: Option<usize>,
}

impl Detection {
    pub fn list_mode(&self) -> bool {
        matches!(self.item, ItemSource::ListColumn(_))
    }
}

/// Lowercases and strips everything but ASCII alphanumerics, so
/// `"Order ID"`, `"order_id"`, and `"ORDER-ID"` all compare equal.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Matches headers against a synonym list: exact normalized match first,
/// then substring containment in either direction. First header in table
/// order wins within each pass.
pub fn match_column(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    let normalized = headers.iter().map(|h| normalize_name(h)).collect::<Vec<_>>();
    let candidates = synonyms.iter().map(|s| normalize_name(s)).collect::<Vec<_>>();

    for (idx, name) in normalized.iter().enumerate() {
        if candidates.iter().any(|c| c == name) {
            return Some(idx);
        }
    }
    for (idx, name) in normalized.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        if candidates
            .iter()
            .any(|c| !c.is_empty() && (name.contains(c.as_str()) || c.contains(name.as_str())))
        {
            return Some(idx);
        }
    }
    None
}

/// Detects column roles for a frame.
///
/// A list-format column together with an order column switches the frame
/// into list mode, overriding plain item detection. Failing any synonym
/// match, the highest-cardinality string-like column is taken as the item
/// column as a last resort.
pub fn detect(frame: &Frame) -> Result<Detection, AnalysisError> {
    let headers = frame.headers();
    let list_col = match_column(headers, LIST_FORMAT_SYNONYMS);
    let item_col = match_column(headers, ITEM_SYNONYMS);
    let order = match_column(headers, ORDER_SYNONYMS);
    let customer = match_column(headers, CUSTOMER_SYNONYMS);
    let date = match_column(headers, DATE_SYNONYMS);

    if let (Some(list_idx), Some(_)) = (list_col, order) {
        return Ok(Detection {
            item: ItemSource::ListColumn(list_idx),
            order,
            customer,
            date,
        });
    }

    let item_idx = match item_col {
        Some(idx) => idx,
        None => fallback_item_column(frame).ok_or(AnalysisError::NoItemColumn)?,
    };

    Ok(Detection {
        item: ItemSource::Column(item_idx),
        order,
        customer,
        date,
    })
}

/// Last-resort item column: the string-like column with the most distinct
/// non-empty values. Earlier columns win ties.
fn fallback_item_column(frame: &Frame) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for idx in 0..frame.n_cols() {
        if !frame.is_string_like(idx) {
            continue;
        }
        let cardinality = frame.distinct_non_empty(idx);
        if best.map(|(_, n)| cardinality > n).unwrap_or(true) {
            best = Some((idx, cardinality));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(headers: &[&str], rows: &[&[&str]]) -> Frame {
        Frame::from_rows(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .expect("frame")
    }

    #[test]
    fn normalize_name_strips_punctuation_and_case() {
        assert_eq!(normalize_name("  Order ID "), "orderid");
        assert_eq!(normalize_name("product-name"), "productname");
        assert_eq!(normalize_name("###"), "");
    }

    #[test]
    fn exact_match_beats_substring_match() {
        let headers = vec!["product description".to_string(), "item".to_string()];
        assert_eq!(match_column(&headers, ITEM_SYNONYMS), Some(1));
    }

    #[test]
    fn substring_match_works_both_directions() {
        let headers = vec!["my_invoice_number_col".to_string()];
        assert_eq!(match_column(&headers, ORDER_SYNONYMS), Some(0));
        let headers = vec!["sk".to_string()];
        assert_eq!(match_column(&headers, ITEM_SYNONYMS), Some(0));
    }

    #[test]
    fn empty_normalized_header_never_matches() {
        let headers = vec!["###".to_string()];
        assert_eq!(match_column(&headers, ITEM_SYNONYMS), None);
    }

    #[test]
    fn list_column_plus_order_triggers_list_mode() {
        let frame = frame(
            &["order_id", "items"],
            &[&["O1", "milk, bread"], &["O2", "eggs"]],
        );
        let detection = detect(&frame).expect("detection");
        assert!(detection.list_mode());
        assert_eq!(detection.item, ItemSource::ListColumn(1));
        assert_eq!(detection.order, Some(0));
    }

    #[test]
    fn list_column_without_order_falls_back_to_plain_item() {
        let frame = frame(&["tags"], &[&["a"], &["b"]]);
        let detection = detect(&frame).expect("detection");
        assert_eq!(detection.item, ItemSource::Column(0));
    }

    #[test]
    fn cardinality_fallback_picks_most_distinct_string_column() {
        let frame = frame(
            &["qty", "colx", "coly"],
            &[
                &["1", "north", "milk"],
                &["2", "north", "bread"],
                &["3", "south", "eggs"],
            ],
        );
        let detection = detect(&frame).expect("detection");
        assert_eq!(detection.item, ItemSource::Column(2));
    }

    #[test]
    fn all_numeric_frame_yields_no_item_column() {
        let frame = frame(&["qty", "price"], &[&["1", "2.5"], &["3", "4.0"]]);
        assert!(matches!(detect(&frame), Err(AnalysisError::NoItemColumn)));
    }
}
