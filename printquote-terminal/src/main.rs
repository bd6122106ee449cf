//! printquote: quote 3D prints from STL files and preview them in the terminal.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=printquote_core=info` - Parses, quotes and cart changes
//! - `RUST_LOG=printquote_core=debug` - Format detection and viewport events
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Quote a bracket in PETG at high quality, three copies
//! printquote quote bracket.stl --material petg --quality high --quantity 3
//!
//! # JSON output for scripting
//! printquote --format json info bracket.stl
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use printquote_core::ModelError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{catalog, info, quote, view};

/// printquote - Instant pricing for 3D printed parts.
///
/// Reads binary or ASCII STL files, measures them, and estimates price,
/// print time and filament weight.
#[derive(Parser)]
#[command(name = "printquote")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Material and quality tables to use instead of the built-in ones (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display model dimensions, volume and triangle count
    Info {
        /// Input model file
        input: PathBuf,
    },

    /// Estimate price, print time and weight
    Quote {
        /// Input model file
        input: PathBuf,

        /// Material id (see `printquote catalog`)
        #[arg(long, short)]
        material: Option<String>,

        /// Color name, stocked by the chosen material
        #[arg(long, short)]
        color: Option<String>,

        /// Print quality id
        #[arg(long)]
        quality: Option<String>,

        /// Infill percentage
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        infill: Option<u32>,

        /// Uniform scale in percent
        #[arg(long, value_parser = clap::value_parser!(u32).range(25..=300))]
        scale: Option<u32>,

        /// Number of copies
        #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(1..))]
        quantity: Option<u32>,
    },

    /// Preview a model in an interactive terminal viewport
    View {
        /// Input model file
        input: PathBuf,

        /// Material whose colors the viewer cycles through
        #[arg(long, short)]
        material: Option<String>,

        /// Initial color name
        #[arg(long, short)]
        color: Option<String>,
    },

    /// List materials, colors and print qualities
    Catalog,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // Check RUST_LOG first, then fall back to -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "printquote_core=info,printquote=info",
            2 => "printquote_core=debug,printquote=debug,printquote_terminal=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn hint(err: &ModelError) -> &'static str {
    match err {
        ModelError::UnsupportedExtension { .. } => "upload a .stl, .obj or .3mf file",
        ModelError::Truncated { .. } => "the file looks like a cut-off binary STL; re-export it",
        ModelError::UnsupportedFormat { .. } => "only binary and ASCII STL files can be measured",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Quote {
            input,
            material,
            color,
            quality,
            infill,
            scale,
            quantity,
        } => quote::run(
            input,
            quote::Overrides {
                material: material.as_deref(),
                color: color.as_deref(),
                quality: quality.as_deref(),
                infill: *infill,
                scale: *scale,
                quantity: *quantity,
            },
            &cli,
        ),
        Commands::View { input, material, color } => {
            view::run(input, material.as_deref(), color.as_deref(), &cli)
        }
        Commands::Catalog => catalog::run(&cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            eprintln!("{}: {}", "Error".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {}", "Caused by".yellow(), cause);
            }
            if let Some(model_err) = e.downcast_ref::<ModelError>() {
                eprintln!("  {}: {}", "Suggestion".green(), hint(model_err));
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
