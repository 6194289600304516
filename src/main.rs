//! strandpress CLI - press text into an encrypted ledger and release it
//!
//! A thin adapter over `Presser::press` and `Presser::release` backed by a
//! `FileLedger`. Output is JSON so the tool can be wrapped by other programs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strandpress::{Config, FileLedger, Hash, HybridEngine, KeyFile, KeyPair, Presser};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strandpress")]
#[command(about = "Press text into an encrypted content-addressed tree and release it")]
#[command(version)]
struct Cli {
    /// Path to the ledger file (defaults to the configured ledger)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty ledger
    Init,

    /// Generate a recipient key pair
    Keygen {
        /// Write the key pair to this file instead of printing the secret
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Encrypt text into the ledger for a recipient
    Press {
        /// The text to press
        text: String,
        /// Recipient public key (hex, SEC1)
        #[arg(short, long)]
        recipient: String,
        /// Include the path events in the output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decrypt and reassemble the text under a root hash
    Release {
        /// Root hash returned by press
        root: String,
        /// Key file holding the recipient key pair
        #[arg(short, long)]
        key: Option<PathBuf>,
    },

    /// List the nodes under a root hash without decrypting
    Inspect {
        /// Root hash returned by press
        root: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli) {
        let _ = output(
            &format,
            &serde_json::json!({
                "status": "error",
                "message": format!("{:#}", e)
            }),
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };
    init_logging(&config.log_level);

    let ledger_path = cli.ledger.clone().unwrap_or(config.ledger_path.clone());

    match cli.command {
        Commands::Init => {
            let ledger = FileLedger::create(&ledger_path)?;
            ledger.sync()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "message": format!("Created ledger at {}", ledger_path.display())
                }),
            )?;
        }

        Commands::Keygen { out } => {
            let keys = KeyPair::generate();
            match out {
                Some(path) => {
                    KeyFile::save(&keys, &path)
                        .with_context(|| format!("writing key file {}", path.display()))?;
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "ok",
                            "public_key": keys.public_hex(),
                            "key_file": path.display().to_string()
                        }),
                    )?;
                }
                None => {
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "ok",
                            "public_key": keys.public_hex(),
                            "secret_key": keys.secret_hex()
                        }),
                    )?;
                }
            }
        }

        Commands::Press {
            text,
            recipient,
            verbose,
        } => {
            let presser = Presser::new(FileLedger::open_or_create(&ledger_path)?);
            let receipt = presser.press_detailed(&text, &recipient)?;
            presser.ledger().sync()?;

            let mut value = serde_json::json!({
                "status": "ok",
                "root": receipt.root.to_hex(),
                "events": receipt.events.len()
            });
            if verbose {
                value["path"] = receipt
                    .events
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "hash": e.hash.to_hex(),
                            "components": [e.components.left.to_hex(), e.components.right.to_hex()],
                            "index": e.index
                        })
                    })
                    .collect();
            }
            output(&cli.format, &value)?;
        }

        Commands::Release { root, key } => {
            let root: Hash = root.parse()?;
            let key_path = key
                .or(config.key_path)
                .context("no key file given (use --key or set key_path in the config)")?;
            let keys = KeyFile::load(&key_path)?;

            let presser = Presser::new(FileLedger::open(&ledger_path)?)
                .with_engine(HybridEngine::new(keys));
            let text = presser.release(root)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "root": root.to_hex(),
                    "text": text
                }),
            )?;
        }

        Commands::Inspect { root } => {
            let root: Hash = root.parse()?;
            let presser = Presser::new(FileLedger::open(&ledger_path)?);
            let nodes = presser.inspect(root)?;
            let items: Vec<_> = nodes
                .iter()
                .map(|(hash, components)| {
                    serde_json::json!({
                        "hash": hash.to_hex(),
                        "kind": if components.is_leaf() { "leaf" } else { "pair" },
                        "components": [components.left.to_hex(), components.right.to_hex()]
                    })
                })
                .collect();
            output(
                &cli.format,
                &serde_json::json!({
                    "root": root.to_hex(),
                    "count": items.len(),
                    "leaves": nodes.leaf_count(),
                    "nodes": items
                }),
            )?;
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn output(format: &OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
