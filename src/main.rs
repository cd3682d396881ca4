use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use cragflat::config::{CliOverrides, CompressionKind, ExportConfig};
use cragflat::flattener::{self, ExportRow, FlattenOptions};
use cragflat::openbeta_client::{self, OpenBetaClient};
use cragflat::parquet_writer::{self, ExportStats};
use cragflat::row_filter::RowPredicate;

/// Cragflat - OpenBeta climb exporter
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Read climbs from a local JSON dump instead of the API
    #[arg(long)]
    input_json: Option<PathBuf>,

    /// Parquet output path (overrides the config file)
    #[arg(long)]
    output: Option<String>,

    /// Compression codec: snappy, zstd, gzip, lz4 or none
    #[arg(long)]
    compression: Option<CompressionKind>,

    /// Keep only climbs in this country (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Drop the description column
    #[arg(long)]
    no_description: bool,

    /// Rows of sample output to print after the export
    #[arg(long)]
    sample: Option<usize>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        CliOverrides {
            output: cli.output.clone(),
            compression: cli.compression,
            countries: cli.countries.clone(),
            no_description: cli.no_description,
            sample_rows: cli.sample,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Defaults to INFO, override with RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\ncragflat v{}\n", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        log::error!("export failed: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides: CliOverrides = (&cli).into();

    let mut config = if cli.config.exists() {
        ExportConfig::from_yaml_file(&cli.config)?
    } else {
        log::info!("no config file at {}, using defaults", cli.config.display());
        ExportConfig::default()
    };
    config.apply_env();
    config.apply_overrides(overrides)?;

    let mut climbs = match &cli.input_json {
        Some(path) => {
            log::info!("Loading climbs from {}...", path.display());
            openbeta_client::load_climbs_from_file(path)?
        }
        None => {
            let client =
                OpenBetaClient::new(config.export.api_url.clone(), config.export.page_size)?;
            client.fetch_all_climbs().await?
        }
    };
    anyhow::ensure!(!climbs.is_empty(), "no climbs found");

    if let Some(predicate) = config
        .filter
        .as_ref()
        .map(RowPredicate::from_config)
        .filter(|p| !p.is_empty())
    {
        let fetched = climbs.len();
        let removed = predicate.apply(&mut climbs);
        anyhow::ensure!(!climbs.is_empty(), "no climbs remained after filtering");
        if removed > 0 {
            log::info!("Filtered {fetched} climbs down to {}", climbs.len());
        }
    }

    let options = FlattenOptions {
        include_description: config.export.include_description,
        absent_type_flags: config.export.absent_type_flags,
        // Filtering already happened on the climb list.
        predicate: None,
    };
    let rows = flattener::flatten_climbs(&climbs, &options)?;

    // Size of the surviving records as plain JSON, for the compression
    // comparison.
    let json_bytes = serde_json::to_vec(&climbs)?.len() as u64;
    log::info!(
        "JSON intermediate size: {:.2} MB",
        json_bytes as f64 / (1024.0 * 1024.0)
    );

    let output_path = PathBuf::from(&config.export.output.filename);
    let compression = config.export.output.compression;
    log::info!(
        "Exporting {} rows to {} ({})...",
        rows.len(),
        output_path.display(),
        compression.as_str()
    );
    parquet_writer::write_parquet(
        &rows,
        &output_path,
        config.export.include_description,
        compression,
    )?;

    let parquet_bytes = std::fs::metadata(&output_path)?.len();
    let stats = ExportStats::new(rows.len(), json_bytes, parquet_bytes);
    stats.write_to(Path::new(&config.export.output.stats_filename))?;

    println!(
        "Export complete: {} ({:.2} MB)",
        output_path.display(),
        stats.parquet_size_mb
    );
    println!(
        "  Size comparison: JSON {:.2} MB -> Parquet {:.2} MB",
        stats.json_size_mb, stats.parquet_size_mb
    );
    println!(
        "  Compression: {:.1}x smaller ({:.1}% space saved)",
        stats.compression_ratio, stats.space_saved_pct
    );

    print_sample(&rows, config.export.sample_rows, config.export.include_description);

    println!("\nExport successful!");
    Ok(())
}

/// Print the first few rows as a pipe-separated table, cells truncated so
/// long descriptions do not flood the terminal.
fn print_sample(rows: &[ExportRow], sample_rows: usize, include_description: bool) {
    if sample_rows == 0 || rows.is_empty() {
        return;
    }
    let shown = sample_rows.min(rows.len());

    println!("\nSample data (first {shown} rows):");
    let header = flattener::export_columns(include_description).join(" | ");
    println!("{header}");
    println!("{}", "-".repeat(header.len().min(120)));
    for row in &rows[..shown] {
        let cells: Vec<String> = row
            .display_values(include_description)
            .into_iter()
            .map(|cell| cell.chars().take(30).collect())
            .collect();
        println!("{}", cells.join(" | "));
    }
}
