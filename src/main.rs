//! Binary entrypoint for the charsheet CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and seed the store from `data/seeds/`
//! - `show [--json]` - print the current sheet
//! - `apply <json>` - apply one action and print the result
//! - `catalog` - list the shop
//! - `journal [--limit N]` - print recent actions
//!
//! See the library crate docs for module-level details: `charsheet::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::Path;

use charsheet::config::Config;
use charsheet::engine::{
    format_catalog, format_container, load_catalog_from_json, load_character_from_json, Action,
    Catalog, Engine, Outcome, SheetStore, Snapshot,
};

#[derive(Parser)]
#[command(name = "charsheet")]
#[command(about = "Character sheet, inventory and shop manager")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and seed the character store
    Init,
    /// Print the current sheet
    Show {
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one JSON action, e.g. '{"action":"sell","id":"...","qty":1}'
    Apply {
        action: String,
        /// Print the resulting snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the shop catalog
    Catalog,
    /// Show recent journal entries
    Journal {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            if !Path::new(&cli.config).exists() {
                Config::create_default(&cli.config).await?;
                info!("Wrote default configuration to {}", cli.config);
            }
            let config = Config::load(&cli.config).await?;
            let store = SheetStore::open(config.storage.store_path())?;
            let seed = load_character_from_json(&config.storage.character_seed_path)?;
            if store.seed_if_empty(seed)? {
                println!("Seeded character from {}", config.storage.character_seed_path);
            } else {
                println!("Character store already initialized");
            }
        }
        command => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            run(command, &config)?;
        }
    }

    Ok(())
}

fn load_catalog(config: &Config) -> Catalog {
    match load_catalog_from_json(&config.storage.catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Shop catalog unavailable: {}", e);
            Catalog::default()
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let engine = Engine::new(config.rules.clone(), load_catalog(config));

    match command {
        Commands::Catalog => {
            for line in format_catalog(engine.catalog()) {
                println!("{}", line);
            }
        }
        Commands::Show { json } => {
            let store = SheetStore::open(config.storage.store_path())?;
            let state = store
                .load_state()
                .map_err(|e| anyhow!("{} (run `charsheet init` first)", e))?;
            print_sheet(&engine.snapshot(&state), &state, json)?;
        }
        Commands::Apply { action, json } => {
            let store = SheetStore::open(config.storage.store_path())?;
            let action = Action::from_json(&action)?;
            let outcome = store.apply(&engine, &action)?;
            let state = store.load_state()?;
            match &outcome {
                Outcome::Applied(snapshot) => print_sheet(snapshot, &state, json)?,
                Outcome::Rejected { error, .. } => {
                    println!("{}", serde_json::to_string_pretty(&error.to_json())?);
                }
            }
        }
        Commands::Journal { limit } => {
            let store = SheetStore::open(config.storage.store_path())?;
            for entry in store.journal(limit)? {
                println!(
                    "#{} {} [{}] {}",
                    entry.seq,
                    entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.outcome,
                    entry.action
                );
            }
        }
        Commands::Init => return Err(anyhow!("init is handled before the store is opened")),
    }
    Ok(())
}

fn print_sheet(snapshot: &Snapshot, state: &charsheet::engine::SheetState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    for line in snapshot.summary_lines() {
        println!("{}", line);
    }
    for line in format_container("Bag", &state.bag) {
        println!("{}", line);
    }
    for line in format_container("Chest", &state.chest) {
        println!("{}", line);
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
