pub mod analyze;
pub mod apriori;
pub mod cli;
pub mod dates;
pub mod detect;
pub mod error;
pub mod export;
pub mod frame;
pub mod io_utils;
pub mod render;
pub mod rules;
pub mod transactions;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};
use crate::detect::ItemSource;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("basket_miner", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Detect(args) => handle_detect(&args),
    }
}

fn handle_detect(args: &cli::DetectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter, encoding)?;
    let frame = frame::Frame::from_path(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading table from {:?}", args.input))?;
    let detection = detect::detect(&frame)?;

    let header = |idx: usize| frame.headers()[idx].clone();
    let role_row = |role: &str, column: Option<usize>| {
        vec![
            role.to_string(),
            column.map(|idx| header(idx)).unwrap_or_default(),
        ]
    };
    let (item_role, item_idx) = match detection.item {
        ItemSource::Column(idx) => ("item", idx),
        ItemSource::ListColumn(idx) => ("item (list)", idx),
    };
    let rows = vec![
        role_row(item_role, Some(item_idx)),
        role_row("order", detection.order),
        role_row("customer", detection.customer),
        role_row("date", detection.date),
    ];
    let headers = vec!["role".to_string(), "column".to_string()];
    render::print_table(&headers, &rows);
    info!(
        "Detected roles for {} column(s) in {:?}",
        frame.n_cols(),
        args.input
    );
    Ok(())
}
