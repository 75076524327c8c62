//! Signalab CLI — analyze, compare and export commands.
//!
//! Commands:
//! - `analyze` — run the pipeline on one symbol and print both recommendations
//! - `compare` — analyze several symbols in parallel and print a comparison table
//! - `export` — write the JSON summary and per-bar CSV for one symbol
//!
//! Bars come from `<data-dir>/<SYMBOL>.csv`; `--synthetic` enables the
//! deterministic demo generator as a fallback.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use signalab_core::{analyze, AnalysisConfig, AnalysisPath, AnalysisWindow, DataSource, Recommendation};
use signalab_runner::{
    compare, export_comparison_csv, recommendation_json, save_artifacts, CompareOptions,
    ComparisonRow, CsvDirProvider, DataLoader,
};

#[derive(Parser)]
#[command(
    name = "signalab",
    about = "Signalab CLI — technical-analysis recommendations from daily bars"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Directory holding <SYMBOL>.csv files.
    #[arg(long, alias = "path", global = true)]
    data_dir: Option<PathBuf>,

    /// Fall back to deterministic synthetic bars when a symbol has no data.
    #[arg(long, default_value_t = false, global = true)]
    synthetic: bool,

    /// Analysis window: 1mo, 3mo, 6mo, 1y, 2y or 5y. Overrides the config file.
    #[arg(long, global = true)]
    window: Option<AnalysisWindow>,

    /// Path to a TOML analysis config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PathArg {
    Basic,
    Advanced,
}

impl From<PathArg> for AnalysisPath {
    fn from(p: PathArg) -> Self {
        match p {
            PathArg::Basic => AnalysisPath::Basic,
            PathArg::Advanced => AnalysisPath::Advanced,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one symbol and print its recommendations.
    Analyze {
        symbol: String,

        /// Print flat JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Analyze several symbols and print a comparison table.
    Compare {
        /// At least two symbols (e.g., SPY QQQ IWM).
        #[arg(required = true, num_args = 2..)]
        symbols: Vec<String>,

        /// Which recommendation path fills the comparison table.
        #[arg(long, value_enum, default_value = "basic")]
        mode: PathArg,

        /// Worker threads. Defaults to the rayon global pool.
        #[arg(long)]
        threads: Option<usize>,

        /// Print CSV instead of a text table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Write <SYMBOL>_analysis.json and <SYMBOL>_bars.csv.
    Export {
        symbol: String,

        /// Output directory.
        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "signalab=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.source)?;
    let loader = build_loader(&cli.source);

    match cli.command {
        Commands::Analyze { symbol, json } => run_analyze(&symbol, &loader, &config, json),
        Commands::Compare {
            symbols,
            mode,
            threads,
            csv,
        } => run_compare(
            &symbols,
            &loader,
            &config,
            CompareOptions {
                path: mode.into(),
                threads,
            },
            csv,
        ),
        Commands::Export { symbol, out } => run_export(&symbol, &loader, &config, out),
    }
}

fn load_config(source: &SourceArgs) -> Result<AnalysisConfig> {
    let mut config = match &source.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(window) = source.window {
        config = config.with_window(window);
    }
    Ok(config)
}

fn build_loader(source: &SourceArgs) -> DataLoader {
    let primary = source
        .data_dir
        .as_ref()
        .map(|dir| Box::new(CsvDirProvider::new(dir)) as Box<dyn signalab_core::SeriesProvider>);
    let loader = DataLoader::new(primary);
    if source.synthetic {
        loader.with_synthetic_fallback(chrono::Local::now().date_naive())
    } else {
        loader
    }
}

fn run_analyze(symbol: &str, loader: &DataLoader, config: &AnalysisConfig, json: bool) -> Result<()> {
    let symbol = symbol.trim().to_uppercase();
    let loaded = loader.load(&symbol, config.window)?;
    let analysis = analyze(&loaded.series, config)?;

    if json {
        let value = serde_json::json!({
            "basic": analysis.basic.to_flat_json(),
            "advanced": analysis.advanced.to_flat_json(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("=== {} ===", analysis.symbol());
    println!("Window:         {}", config.window);
    if let Some(first) = analysis.series.bars().first() {
        println!(
            "Bars:           {} ({} to {})",
            analysis.series.len(),
            first.date,
            analysis.basic.as_of
        );
    }
    println!(
        "Fingerprint:    {}",
        analysis.fingerprint.get(..16).unwrap_or(&analysis.fingerprint)
    );
    if !analysis.unavailable.is_empty() {
        let names: Vec<String> = analysis.unavailable.iter().map(|k| k.to_string()).collect();
        println!("Unavailable:    {}", names.join(", "));
    }
    print_recommendation(&analysis.basic);
    print_recommendation(&analysis.advanced);
    if loaded.source == DataSource::Synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    let price = |v: Option<f64>| v.map_or("-".to_string(), |p| format!("{p:.2}"));

    println!();
    println!("--- {} ---", rec.path);
    println!("Recommendation: {} ({} confidence)", rec.category, rec.confidence);
    println!("Score:          {:+.3}", rec.score);
    println!("Price:          {:.2}", rec.price);
    println!("RSI:            {}", rec.rsi.map_or("-".to_string(), |r| format!("{r:.1}")));
    println!("Target:         {}", price(rec.targets.target));
    println!("Second target:  {}", price(rec.targets.secondary_target));
    println!("Stop loss:      {}", price(rec.targets.stop_loss));

    let detail = &rec.detail;
    let label = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    println!("RSI zone:       {}", label(detail.rsi_zone.map(|z| z.to_string())));
    println!("Bands:          {}", label(detail.band_position.map(|b| b.to_string())));
    println!("MACD:           {}", label(detail.macd_momentum.map(|m| m.to_string())));
    println!("Trend:          {}", label(detail.trend_strength.map(|t| t.to_string())));
    if let Some(vol) = detail.volatility {
        println!("Volatility:     {} ({:.1}%)", vol.level, vol.annualized_pct);
    }
    if !rec.recent_patterns.is_empty() {
        let names: Vec<&str> = rec.recent_patterns.iter().map(|p| p.name()).collect();
        println!("Patterns:       {}", names.join(", "));
    }
}

fn run_compare(
    symbols: &[String],
    loader: &DataLoader,
    config: &AnalysisConfig,
    options: CompareOptions,
    csv: bool,
) -> Result<()> {
    let rows = compare(symbols, loader, config, options)?;

    if csv {
        print!("{}", export_comparison_csv(&rows)?);
        return Ok(());
    }
    print_comparison(&rows);
    Ok(())
}

fn print_comparison(rows: &[ComparisonRow]) {
    let num = |v: Option<f64>, prec: usize| v.map_or("-".to_string(), |x| format!("{x:.prec$}"));

    println!();
    println!(
        "{:<8} {:>10} {:<18} {:>8} {:>6}",
        "Symbol", "Price", "Recommendation", "Score", "RSI"
    );
    println!("{}", "-".repeat(54));
    for row in rows {
        if let Some(reason) = &row.skipped {
            println!("{:<8} skipped: {reason}", row.symbol);
            continue;
        }
        println!(
            "{:<8} {:>10} {:<18} {:>8} {:>6}",
            row.symbol,
            num(row.price, 2),
            row.recommendation.map(|c| c.to_string()).unwrap_or_default(),
            num(row.score, 3),
            num(row.rsi, 1),
        );
    }
    if rows.iter().any(|r| r.source == Some(DataSource::Synthetic)) {
        println!();
        println!("WARNING: Some rows are based on SYNTHETIC data");
    }
}

fn run_export(symbol: &str, loader: &DataLoader, config: &AnalysisConfig, out: PathBuf) -> Result<()> {
    let symbol = symbol.trim().to_uppercase();
    let loaded = loader.load(&symbol, config.window)?;
    let analysis = analyze(&loaded.series, config)?;

    println!("{}", recommendation_json(&analysis.advanced)?);
    let paths = save_artifacts(&analysis, &out)?;
    println!("Summary saved to: {}", paths.summary_json.display());
    println!("Bars saved to:    {}", paths.bars_csv.display());
    Ok(())
}
