use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::{Env, Target};
use flight_lookup::LookupConfig;
use std::fs::{self, File};

mod lookup;
mod tui;

#[derive(Parser)]
#[command(name = "flightdesk")]
#[command(about = "Airport and airline lookup for flight search", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Lookup API base URL (overrides the config file and FLIGHTDESK_API_URL)
    #[arg(long = "api-url", global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up airports or airlines matching a query
    #[command(alias = "l")]
    Lookup(lookup::LookupArgs),

    /// Fill in origin, destination and airline interactively
    #[command(alias = "f")]
    Form(tui::FormArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    let mut builder = env_logger::Builder::from_env(env);
    // The form owns the terminal, so its logs go to a file
    if matches!(cli.command, Commands::Form(_)) {
        if let Some(file) = open_log_file() {
            builder.target(Target::Pipe(Box::new(file)));
        }
    }
    builder.init();

    let config = load_config(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Lookup(args) => lookup::execute(args, config),
        Commands::Form(args) => tui::execute(args, config),
    }
}

fn load_config(api_url: Option<&str>) -> anyhow::Result<LookupConfig> {
    let mut config = LookupConfig::load().context("Failed to load lookup configuration")?;
    if let Some(url) = api_url {
        config.set_base_url(url)?;
    }
    log::debug!("Using lookup API at {}", config.base_url);
    Ok(config)
}

fn open_log_file() -> Option<File> {
    let dir = dirs::home_dir()?.join(".flightdesk");
    fs::create_dir_all(&dir).ok()?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("flightdesk.log"))
        .ok()
}
