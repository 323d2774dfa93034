use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use phonebook::{
    Backend, Config, Contact, ContactBook, Error, FileStorage, SqliteStorage, Storage, ValidationError,
    validate_contact,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Phonebook CLI - add, filter and delete locally stored contacts")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/phonebook/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the contact store (overrides config)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Log level: trace, debug, info, warn, error (overrides config)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a contact
    Add {
        /// Name Surname
        name: String,

        /// Phone number, formatted 123-45-67
        number: String,
    },

    /// Delete a contact by id
    Delete { id: String },

    /// List contacts, optionally filtered by name
    List {
        /// Show only contacts whose name contains this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        filter: String,
    },
}

/// How a command finished; `Rejected` maps to exit status 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Rejected,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(config.log_level()?)
        .init();

    let mut book = ContactBook::open(open_storage(&config)?).context("Failed to load contacts")?;

    let outcome = run(cli.command, &mut book, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    if outcome == Outcome::Rejected {
        process::exit(1);
    }

    Ok(())
}

/// Load the config file and apply command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.store_path {
        config.storage.path = Some(path.clone());
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn run<S: Storage>(
    command: Commands,
    book: &mut ContactBook<S>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    match command {
        Commands::Add { name, number } => {
            if let Err(e) = validate_contact(&name, &number) {
                writeln!(err, "{}", render_invalid(&e).red())?;
                return Ok(Outcome::Rejected);
            }

            match book.add_contact(&name, &number) {
                Ok(contact) => {
                    writeln!(out, "{} {}", "Added".green(), render(&contact))?;
                }
                Err(e @ Error::DuplicateName { .. }) => {
                    writeln!(err, "{}", e.to_string().red())?;
                    return Ok(Outcome::Rejected);
                }
                Err(e) => return Err(e).context("Failed to add contact"),
            }
        }
        Commands::Delete { id } => {
            if let Some(contact) = book.delete_contact(&id).context("Failed to delete contact")? {
                writeln!(out, "{} {}", "Deleted".green(), render(&contact))?;
            }
        }
        Commands::List { filter } => {
            book.set_filter(&filter);
            let contacts = book.visible_contacts();

            if contacts.is_empty() {
                writeln!(out, "{}", "No Results".yellow())?;
            } else {
                for contact in contacts {
                    writeln!(out, "{}", render(contact))?;
                }
            }
        }
    }

    Ok(Outcome::Done)
}

fn open_storage(config: &Config) -> Result<Box<dyn Storage>> {
    let path = config.store_path()?;
    let context = || format!("Failed to open store at {}", path.display());

    let storage: Box<dyn Storage> = match config.storage.backend {
        Backend::Sqlite => Box::new(SqliteStorage::open(&path).with_context(context)?),
        Backend::File => Box::new(FileStorage::open(&path).with_context(context)?),
    };

    Ok(storage)
}

fn render(contact: &Contact) -> String {
    format!("{}: {}  {}", contact.name.bold(), contact.number, contact.id.dimmed())
}

fn render_invalid(e: &ValidationError) -> String {
    format!("{}: {}", e.field(), e)
}
