//! Easel CLI - render sandboxed WASM drawing programs to images.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use easel_host::observability::{LogFormat, TracingConfig, init_tracing};

/// Easel - a sandboxed canvas host for WASM drawing guests.
#[derive(Parser)]
#[command(name = "easel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a drawing program once and write the surface to disk
    Render {
        /// Path to the guest module (.wasm)
        #[arg(short, long)]
        module: String,

        /// Path to the drawing program text
        #[arg(short, long)]
        file: String,

        /// Output image path (binary PPM)
        #[arg(short, long)]
        out: String,

        /// Surface width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        /// Theme YAML file
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Render continuously, re-rendering when the program or theme changes
    Watch {
        /// Path to the guest module (.wasm)
        #[arg(short, long)]
        module: String,

        /// Path to the drawing program text
        #[arg(short, long)]
        file: String,

        /// Output image path (binary PPM)
        #[arg(short, long)]
        out: String,

        /// Surface width in pixels
        #[arg(long, default_value = "800")]
        width: u32,

        /// Surface height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        /// Theme YAML file
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Check a guest module and program without writing any output
    Validate {
        /// Path to the guest module (.wasm)
        #[arg(short, long)]
        module: String,

        /// Path to the drawing program text
        #[arg(short, long)]
        file: String,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Check for explicit log format override, otherwise auto-detect
    let log_format = std::env::var("EASEL_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse::<LogFormat>().ok())
        .unwrap_or_else(|| {
            if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            }
        });

    // Build config, respecting RUST_LOG if set
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| filter.to_string());

    let config = TracingConfig::builder()
        .log_format(log_format)
        .log_filter(log_filter)
        .build();

    init_tracing(&config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Render {
            module,
            file,
            out,
            width,
            height,
            theme,
        } => commands::render::run(&module, &file, &out, width, height, theme.as_deref()),
        Commands::Watch {
            module,
            file,
            out,
            width,
            height,
            theme,
        } => commands::watch::run(&module, &file, &out, width, height, theme.as_deref()),
        Commands::Validate { module, file } => commands::validate::run(&module, &file),
        Commands::Version => commands::version::run(),
    }
}
