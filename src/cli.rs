use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Mine association rules from messy CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full basket analysis and print rules and frequent itemsets
    Analyze(AnalyzeArgs),
    /// Show which columns would be used for items, orders, customers, and dates
    Detect(DetectArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input CSV/TSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Minimum support for frequent itemsets, inclusive, in [0, 1]
    #[arg(long = "min-support", default_value_t = 0.001)]
    pub min_support: f64,
    /// Minimum lift for emitted rules, inclusive
    #[arg(long = "min-lift", default_value_t = 1.0)]
    pub min_lift: f64,
    /// Largest itemset size to mine (0 = unlimited)
    #[arg(long = "max-len", default_value_t = 0)]
    pub max_len: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|'); sniffed when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Directory to write rules.csv, frequent_itemsets.csv, and meta.json
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Maximum rows to display per table (0 = all); exports are never truncated
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Input CSV/TSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|'); sniffed when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
