use anyhow::{Context, Result};
use clap::Parser;
use lava_palette::{Config, HistoryLog, PaletteExtractor, export, export_base, sampler};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extract color palettes from images and export them as GIMP palettes and swatch strips.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required_unless_present = "print_config")]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract (defaults to the configured default)
    #[arg(short = 'k', long)]
    colors: Option<usize>,

    /// Output directory for .gpl and .png files
    #[arg(short = 'd', long, default_value = ".")]
    out_dir: PathBuf,

    /// Comma-separated swatch strip scales, e.g. 1,8,32
    #[arg(long, value_delimiter = ',')]
    scales: Option<Vec<u32>>,

    /// Seed for the k-means initializer
    #[arg(long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History file to append to
    #[arg(long)]
    history: Option<PathBuf>,

    /// Do not record exports in the history file
    #[arg(long)]
    no_history: bool,

    /// Print the palette without writing any files
    #[arg(long)]
    no_export: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.quantizer.seed = seed;
    }
    if let Some(scales) = &args.scales {
        config.export.scales = scales.clone();
    }
    if let Some(history) = &args.history {
        config.history.path = history.clone();
    }
    if args.no_history {
        config.history.enabled = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "lava_palette=debug" } else { "lava_palette=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let k = args.colors.unwrap_or(config.quantizer.default_colors);
    let extractor = PaletteExtractor::new(config).context("invalid configuration")?;
    let config = extractor.config();
    let history = HistoryLog::new(&config.history.path);

    for input in &args.inputs {
        let image = sampler::open(input).with_context(|| format!("reading {}", input.display()))?;
        let palette = extractor
            .extract(&image, k)
            .map_err(|e| {
                let message = e.user_message();
                anyhow::Error::new(e).context(message)
            })?;

        println!("{}:", input.display());
        for swatch in palette.swatches() {
            let c = swatch.color;
            println!("  {} {:>3} {:>3} {:>3}  {}", swatch.hex, c.red, c.green, c.blue, swatch.text);
        }

        if args.no_export {
            continue;
        }

        let base = export_base(&args.out_dir, input);
        let written = export(&palette, &base, &config.export.scales).context("export failed")?;
        println!("Saved → {}", written.gpl.display());
        for (_, path) in &written.swatches {
            println!("Saved → {}", path.display());
        }

        if config.history.enabled {
            history
                .record(input, &palette)
                .with_context(|| format!("writing history {}", history.path().display()))?;
        }
    }

    Ok(())
}
