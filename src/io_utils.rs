//! CSV reading/writing, encoding, and delimiter resolution.
//!
//! All file I/O in basket-miner flows through this module:
//!
//! - **Delimiter resolution**: explicit override, then content sniffing on
//!   the header line, then an extension-based default (`.tsv` → tab).
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **stdin**: the `-` path convention routes through standard input.
//! - **Quoting**: CSV artifacts are written with `QuoteStyle::Always`.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Candidate separators tried when sniffing, in priority order.
const SNIFF_CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

fn extension_default(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    }
}

/// Resolves the input delimiter: explicit override wins, then header-line
/// sniffing, then the extension default. Sniffing is skipped for stdin.
pub fn resolve_input_delimiter(
    path: &Path,
    provided: Option<u8>,
    encoding: &'static Encoding,
) -> Result<u8> {
    if let Some(delimiter) = provided {
        return Ok(delimiter);
    }
    if is_dash(path) {
        return Ok(DEFAULT_CSV_DELIMITER);
    }
    match sniff_delimiter(path, encoding)? {
        Some(delimiter) => Ok(delimiter),
        None => Ok(extension_default(path)),
    }
}

/// Counts candidate separators in the first non-empty line and picks the
/// most common one. Returns `None` when the header contains no candidate,
/// leaving the choice to the extension default.
pub fn sniff_delimiter(path: &Path, encoding: &'static Encoding) -> Result<Option<u8>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("Reading header line from {path:?}"))?;
        if read == 0 {
            return Ok(None);
        }
        let decoded = decode_bytes(&line, encoding)?;
        if !decoded.trim().is_empty() {
            let mut best: Option<(u8, usize)> = None;
            for candidate in SNIFF_CANDIDATES {
                let count = decoded.bytes().filter(|b| *b == candidate).count();
                if count > 0 && best.map(|(_, n)| count > n).unwrap_or(true) {
                    best = Some((candidate, count));
                }
            }
            return Ok(best.map(|(delimiter, _)| delimiter));
        }
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter, has_headers))
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = if is_dash(path) {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
        ))
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(base))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}
