//! Folio CLI - Extract key/value rows from PDF documents.

use clap::Parser;
use folio_cli::commands;
use folio_cli::cli::{ConfigAction, ConfigArgs};
use folio_cli::config::load_env_files;
use folio_cli::{Cli, Command, Config, Formatter};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Before parsing, so `.env` can supply FOLIO_CONFIG and RUST_LOG too
    let env_files = load_env_files();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    for path in &env_files {
        debug!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only command output
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,folio_extractor=debug,folio_llm=debug,folio_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> folio_cli::Result<()> {
    let config_path = cli.config.as_deref();
    let config = match Config::load(config_path) {
        Ok(config) => config,
        // `config init --force` must be able to replace a broken file
        Err(e) if is_forced_init(&cli.command) => {
            warn!("Ignoring unreadable configuration: {}", e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await,
        Command::Config(args) => commands::execute_config(args, &config, config_path, &formatter),
    }
}

fn is_forced_init(command: &Command) -> bool {
    matches!(
        command,
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { force: true }
        })
    )
}
