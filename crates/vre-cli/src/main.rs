use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vre")]
#[command(about = "Farm verification & reconciliation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON. Fails on any bad threshold.
    ConfigHash {
        /// Paths in merge order (base -> farm -> season...)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Fail (instead of warn) when the config carries keys nothing reads
        #[arg(long, default_value_t = false)]
        strict_keys: bool,
    },

    /// List the fraud-rule catalog
    Catalog {
        /// Emit JSON instead of one tab-separated line per rule
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run one verification pass over a JSON inputs file
    Run {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Pass inputs (cohorts, curve, overrides, items, records, window)
        #[arg(long)]
        inputs: String,

        /// Write the pass report here instead of stdout
        #[arg(long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist; deployments inject env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::ConfigHash { paths, strict_keys } => commands::config_hash(paths, strict_keys),
        Commands::Catalog { json } => commands::catalog::print_catalog(json),
        Commands::Run {
            config_paths,
            inputs,
            out,
        } => commands::run::run_pass(config_paths, inputs, out),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
