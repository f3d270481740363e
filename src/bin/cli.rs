//! pnkc CLI
//!
//! Command-line front-end for a pnkc dictionary directory.

use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use pnkc::{Bucket, CachedStore, Config, Record, Store, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// pnkc CLI
#[derive(Parser, Debug)]
#[command(name = "pnkc")]
#[command(about = "Flat-file dictionary store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Skip fsync before replacing files
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a word
    Get {
        /// The word to look up
        key: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a word or replace an existing one
    Put {
        /// The word to add or modify
        key: String,

        #[command(flatten)]
        content: Content,
    },

    /// Delete a word
    #[command(alias = "del")]
    Delete {
        /// The word to delete
        key: String,
    },

    /// List words, optionally only one bucket (a-z or '#')
    List {
        bucket: Option<Bucket>,
    },

    /// List words starting with a prefix
    Search {
        prefix: String,
    },

    /// Show per-bucket record counts
    Stats,

    /// Recount bucket files and report index drift
    Verify,

    /// Recount bucket files and repair the index
    Reindex,
}

#[derive(ClapArgs, Debug)]
struct Content {
    /// A meaning (repeatable)
    #[arg(short, long = "meaning")]
    meanings: Vec<String>,

    /// An example sentence (repeatable)
    #[arg(short, long = "example")]
    examples: Vec<String>,

    /// Meanings as one block of text, one per line
    #[arg(long, conflicts_with = "meanings")]
    meanings_text: Option<String>,

    /// Examples as one block of text, one per line
    #[arg(long, conflicts_with = "examples")]
    examples_text: Option<String>,
}

impl Content {
    fn into_lists(self) -> (Vec<String>, Vec<String>) {
        let meanings = match self.meanings_text {
            Some(text) => split_lines(&text),
            None => self.meanings,
        };
        let examples = match self.examples_text {
            Some(text) => split_lines(&text),
            None => self.examples,
        };
        (meanings, examples)
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,pnkc=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_strategy(if args.no_sync {
            SyncStrategy::OsBuffered
        } else {
            SyncStrategy::EveryWrite
        })
        .build();

    match run(config, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config, command: Commands) -> pnkc::Result<ExitCode> {
    if let Some(key) = command_key(&command) {
        if key.is_empty() {
            eprintln!("word must not be empty");
            return Ok(ExitCode::FAILURE);
        }
    }

    match command {
        Commands::Get { key, json } => {
            let store = Store::open(config)?;
            match store.get(&key)? {
                Some(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
                Some(record) => print_record(&record),
                None => {
                    println!("{key} not found");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Put { key, content } => {
            let mut store = Store::open(config)?;
            let (meanings, examples) = content.into_lists();
            let record = Record::new(key, meanings, examples);
            if store.put(&record)? {
                println!("added {}", record.key);
            } else {
                println!("updated {}", record.key);
            }
        }
        Commands::Delete { key } => {
            let mut store = Store::open(config)?;
            if store.delete(&key)? {
                println!("deleted {key}");
            } else {
                println!("{key} does not exist");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::List { bucket } => {
            let store = Store::open(config)?;
            let snapshot = store.scan_all()?;
            match bucket {
                Some(bucket) => snapshot.bucket(bucket).keys().for_each(|k| println!("{k}")),
                None => snapshot.iter().for_each(|r| println!("{}", r.key)),
            }
        }
        Commands::Search { prefix } => {
            let cache = CachedStore::open(config)?;
            for record in cache.snapshot().records_with_prefix(&prefix) {
                println!("{}", record.key);
            }
        }
        Commands::Stats => {
            let store = Store::open(config)?;
            for (bucket, count) in store.counts().filter(|(_, c)| *c > 0) {
                println!("{bucket}  {count}");
            }
            println!("total  {}", store.len());
        }
        Commands::Verify => {
            let store = Store::open(config)?;
            let mismatches = store.verify()?;
            for m in &mismatches {
                println!("{}: index {} but file holds {}", m.bucket, m.indexed, m.actual);
            }
            if !mismatches.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Commands::Reindex => {
            let mut store = Store::open(config)?;
            let repaired = store.reindex()?;
            println!("repaired {} bucket(s)", repaired.len());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn command_key(command: &Commands) -> Option<&str> {
    match command {
        Commands::Get { key, .. } | Commands::Put { key, .. } | Commands::Delete { key } => {
            Some(key.as_str())
        }
        _ => None,
    }
}

fn print_record(record: &Record) {
    println!("word: {}", record.key);
    println!("meanings:");
    for meaning in &record.meanings {
        println!("- {meaning}");
    }
    println!("examples:");
    for example in &record.examples {
        println!("- {example}");
    }
}
