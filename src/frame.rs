//! In-memory string table loaded from CSV input.
//!
//! Upstream files arrive with unpredictable column names, duplicate headers,
//! and mixed cell types, so every cell is normalized to a string at
//! ingestion and all typing decisions happen downstream. Columns are stored
//! column-major; all columns share the same length.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;

use crate::io_utils;

#[derive(Debug, Clone)]
pub struct Frame {
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl Frame {
    /// Builds a frame from row-major data. Headers are deduplicated by
    /// suffixing repeats with `.1`, `.2`, …; short rows are padded with
    /// empty cells and long rows truncated to the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            bail!("Table has no columns");
        }
        let headers = dedupe_headers(headers);
        let width = headers.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); width];
        for mut row in rows {
            row.resize(width, String::new());
            for (idx, cell) in row.into_iter().take(width).enumerate() {
                columns[idx].push(cell);
            }
        }
        Ok(Self { headers, columns })
    }

    pub fn from_path(
        path: &Path,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading headers from {path:?}"))?;
        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            rows.push(io_utils::decode_record(&record, encoding)?);
        }
        Self::from_rows(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column(&self, idx: usize) -> &[String] {
        &self.columns[idx]
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.columns[col][row]
    }

    /// True when at least one non-empty value in the column fails to parse
    /// as a number. Mirrors an "object dtype" test on an all-string table.
    pub fn is_string_like(&self, idx: usize) -> bool {
        self.columns[idx].iter().any(|value| {
            let trimmed = value.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_err()
        })
    }

    /// Number of distinct non-empty trimmed values in the column.
    pub fn distinct_non_empty(&self, idx: usize) -> usize {
        self.columns[idx]
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|name| match seen.get_mut(&name) {
            Some(count) => {
                *count += 1;
                format!("{name}.{count}")
            }
            None => {
                seen.insert(name.clone(), 0);
                name
            }
        })
        .collect()
}
