mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scenewatch",
    about = "Watch an area of interest for new satellite scenes and alert on man-made change",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .scenewatch/)
    #[arg(long, global = true, env = "SCENEWATCH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .scenewatch/ in the current directory
    Init {
        /// Site name written to a new config (default: directory name)
        #[arg(long)]
        site: Option<String>,
    },

    /// Process the newest scene, if it has not been processed yet
    Run,

    /// Show the last processed scene
    State,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { site } => cmd::init::run(&root, site.as_deref(), cli.json),
        Commands::Run => cmd::run::run(&root, cli.json),
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
