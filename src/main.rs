use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use chpip::{
    commands,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "chpip")]
#[command(about = "A tool to manage the base URL of the Python package index")]
#[command(version)]
struct Cli {
    /// Use the Python package index with the specified name
    /// (omit to switch back to the previous one)
    #[arg(short, long)]
    name: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log what chpip reads and writes (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a named Python package index (or update its URL)
    #[command(visible_alias = "register")]
    Set {
        /// Name of the Python package index
        #[arg(short, long)]
        name: String,

        /// Base URL of the Python package index, e.g. https://pypi.org/simple
        #[arg(short, long)]
        index_url: String,
    },

    /// List registered indexes
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active index and pip's effective index-url
    Current,

    /// Run diagnostics on the chpip setup
    Doctor,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, ui: &Ui) -> anyhow::Result<()> {
    let paths = Paths::new()?;

    match cli.command {
        None => commands::activate(&paths, cli.name.as_deref(), ui),
        Some(Commands::Set { name, index_url }) => {
            commands::register(&paths, &name, &index_url, ui)
        }
        Some(Commands::List { json }) => commands::list(&paths, ui, json),
        Some(Commands::Current) => commands::current(&paths, ui),
        Some(Commands::Doctor) => commands::doctor(&paths, ui),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ui = Ui::new(cli.color, cli.no_color);

    match run(cli, &ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.err(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
