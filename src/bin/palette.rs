use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image_to_palette_wasm::{PaletteConfig, PaletteEntry, extract_palette_bytes_with_rng};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Extract color palettes from images (native wrapper around the WASM library).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of palette colors to extract
    #[arg(short = 'n', long, default_value_t = 5)]
    colors: usize,

    /// Seed for reproducible clustering
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding pipeline parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Serialize)]
struct Report {
    input: String,
    palette: Vec<PaletteEntry>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PaletteConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PaletteConfig::default(),
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut reports = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let bytes =
            fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
        let palette = extract_palette_bytes_with_rng(&bytes, args.colors, &config, &mut rng)
            .with_context(|| format!("palette extraction failed for {}", input.display()))?;
        tracing::info!(input = %input.display(), colors = palette.len(), "extracted palette");

        if args.format == Format::Text {
            if args.inputs.len() > 1 {
                println!("{}:", input.display());
            }
            for entry in &palette {
                println!("{:<14}{}  {:>3}%", entry.role, entry.hex, entry.percentage);
            }
        }
        reports.push(Report {
            input: input.display().to_string(),
            palette,
        });
    }

    if args.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}
