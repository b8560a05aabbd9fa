mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "coach",
    about = "AI-coached UP/DOWN prediction round: serve the UI and manage its config",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .coach/)
    #[arg(long, global = true, env = "COACH_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: <root>/.coach/config.yaml)
    #[arg(long, global = true, env = "COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the web UI
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,

        /// Start in live mode regardless of the config's demo_mode
        #[arg(long)]
        live: bool,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        Commands::Config { .. } => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let config_path = root::resolve_config(&root, cli.config.as_deref());

    let result = match cli.command {
        Commands::Ui {
            port,
            no_open,
            live,
        } => cmd::ui::run(&config_path, port, no_open, live),
        Commands::Config { subcommand } => cmd::config::run(&config_path, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
