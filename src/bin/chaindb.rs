//! ChainDB admin CLI
//!
//! Create, inspect and edit a ChainDB file from the command line.
//!
//! Keys and values are given as text and zero-padded to the file's key/value
//! size; printed values have trailing zero bytes trimmed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chaindb::{ChainError, Config, Engine, OpenMode, Result, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// ChainDB CLI
#[derive(Parser, Debug)]
#[command(name = "chaindb")]
#[command(about = "Admin CLI for ChainDB single-file key-value stores")]
#[command(version)]
struct Args {
    /// Database file
    #[arg(short, long, default_value = "./chaindb.db")]
    file: PathBuf,

    /// fdatasync after every write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new database file
    Create {
        /// Number of hash table buckets
        #[arg(short = 'b', long, default_value = "1024")]
        buckets: u32,

        /// Key size in bytes
        #[arg(short, long, default_value = "8")]
        key_size: u32,

        /// Value size in bytes
        #[arg(short, long, default_value = "64")]
        value_size: u32,

        /// Replace the file if it already exists
        #[arg(long)]
        replace: bool,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Show sizes and chain occupancy
    Stats,

    /// Copy live entries into a new file with a different bucket count
    Rebuild {
        /// Destination file
        dst: PathBuf,

        /// Number of hash table buckets in the new file
        #[arg(short = 'b', long)]
        buckets: u32,
    },
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,chaindb=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ChainError::KeyNotFound) => {
            eprintln!("(not found)");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let sync_strategy = if args.sync {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsBuffer
    };

    match args.command {
        Commands::Create {
            buckets,
            key_size,
            value_size,
            replace,
        } => {
            if !replace && args.file.exists() {
                return Err(ChainError::Config(format!(
                    "{} already exists (use --replace)",
                    args.file.display()
                )));
            }
            let config = Config::builder()
                .path(&args.file)
                .mode(OpenMode::ReadWriteReplace)
                .hash_table_size(buckets)
                .key_size(key_size)
                .value_size(value_size)
                .sync_strategy(sync_strategy)
                .build();
            Engine::open(config)?.close()?;
            println!(
                "created {} (buckets={}, key_size={}, value_size={})",
                args.file.display(),
                buckets,
                key_size,
                value_size
            );
        }

        Commands::Get { key } => {
            let db = open(&args.file, OpenMode::ReadOnly, sync_strategy)?;
            let key = pad(&key, db.key_size(), "key")?;
            let value = db.get(&key)?.ok_or(ChainError::KeyNotFound)?;
            println!("{}", render(&value));
            db.close()?;
        }

        Commands::Put { key, value } => {
            let mut db = open(&args.file, OpenMode::ReadWrite, sync_strategy)?;
            let key = pad(&key, db.key_size(), "key")?;
            let value = pad(&value, db.value_size(), "value")?;
            db.put(&key, &value)?;
            db.close()?;
            println!("OK");
        }

        Commands::Del { key } => {
            let mut db = open(&args.file, OpenMode::ReadWrite, sync_strategy)?;
            let key = pad(&key, db.key_size(), "key")?;
            db.delete(&key)?;
            db.close()?;
            println!("OK");
        }

        Commands::Stats => {
            let db = open(&args.file, OpenMode::ReadOnly, sync_strategy)?;
            let stats = db.stats()?;
            println!("file:          {}", db.path().display());
            println!("key_size:      {}", db.key_size());
            println!("value_size:    {}", db.value_size());
            println!("buckets:       {}", stats.buckets);
            println!("used_buckets:  {}", stats.used_buckets);
            println!("live_records:  {}", stats.live_records);
            println!("tombstones:    {}", stats.tombstones);
            println!("longest_chain: {}", stats.longest_chain);
            println!("file_len:      {}", stats.file_len);
            db.close()?;
        }

        Commands::Rebuild { dst, buckets } => {
            let stats = chaindb::rebuild(&args.file, &dst, buckets)?;
            println!(
                "rebuilt into {} ({} live records, longest chain {})",
                dst.display(),
                stats.live_records,
                stats.longest_chain
            );
        }
    }

    Ok(())
}

fn open(path: &Path, mode: OpenMode, sync_strategy: SyncStrategy) -> Result<Engine> {
    let config = Config::builder()
        .path(path)
        .mode(mode)
        .sync_strategy(sync_strategy)
        .build();
    Engine::open(config)
}

/// Zero-pad text to exactly `size` bytes
fn pad(text: &str, size: u32, what: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    if bytes.len() > size as usize {
        return Err(ChainError::Config(format!(
            "{} is {} bytes, the file's {} size is {}",
            what,
            bytes.len(),
            what,
            size
        )));
    }
    let mut out = vec![0u8; size as usize];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// Trailing zero bytes trimmed, lossy UTF-8
fn render(value: &[u8]) -> String {
    let end = value.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&value[..end]).into_owned()
}
