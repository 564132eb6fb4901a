use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gasfree_tron_signer::config::SignerConfig;
use gasfree_tron_signer::permit::{self, Network, PermitTransfer, PERMIT_TRANSFER_TYPE};
use gasfree_tron_signer::tron_wallet::address_from_private_key;
use gasfree_tron_signer::{eip712, keccak256_hex, log_info};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use zeroize::Zeroizing;

const ENV_PRIVATE_KEY: &str = "GASFREE_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "gasfree-tron-signer", version, about = "Sign GasFree TRON PermitTransfer messages")]
struct Cli {
    /// Network whose controller domain is used (overrides GASFREE_NETWORK)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Emit the bare recovery id as v instead of id + 27
    #[arg(long, global = true)]
    raw_v: bool,

    /// Debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a PermitTransfer message read from a file or stdin
    Sign {
        /// Message JSON file (stdin when omitted)
        message: Option<PathBuf>,

        /// Hex private key (falls back to GASFREE_PRIVATE_KEY)
        #[arg(short, long)]
        key: Option<String>,

        /// Print the full transfer request body instead of the bare signature
        #[arg(long)]
        request: bool,

        /// Replace the deadline with now + GASFREE_DEADLINE_SECS (applied anyway when absent)
        #[arg(long)]
        expire: bool,
    },
    /// Print domain separator, struct hash and digest of a message
    Digest {
        /// Message JSON file (stdin when omitted)
        message: Option<PathBuf>,
    },
    /// Print the canonical PermitTransfer type string
    TypeString {
        /// Print its keccak-256 type hash instead
        #[arg(long)]
        hash: bool,
    },
    /// Derive the TRON address of a private key
    Address {
        /// Hex private key (falls back to GASFREE_PRIVATE_KEY)
        #[arg(short, long)]
        key: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SignerConfig::from_env().context("invalid GASFREE_* environment")?;
    if let Some(network) = cli.network {
        config.network = network;
    }
    if cli.raw_v {
        config.chain_style_v = false;
    }
    if cli.debug {
        config.debug_logging = true;
    }
    config.apply_logging();

    match cli.command {
        Commands::Sign { message, key, request, expire } => {
            let key = resolve_key(key)?;
            let mut message = parse_message(&read_payload(message.as_ref())?)?;
            let domain = config.domain();

            if expire || message.get("deadline").map_or(true, Value::is_null) {
                let deadline = permit::deadline_in(config.deadline_window().as_secs());
                message.insert("deadline".to_string(), Value::from(deadline));
            }

            if request {
                let permit = PermitTransfer::from_message(&message)?;
                let body = permit.sign(&key, &domain, config.sign_options())?;
                println!("{}", body.to_json()?);
            } else {
                let sig = permit::sign_permit(&key, &message, &domain, config.sign_options())?;
                println!("{}", sig);
            }
            log_info!("cli", "permit signed", network = config.network);
        }
        Commands::Digest { message } => {
            let message = parse_message(&read_payload(message.as_ref())?)?;
            let pre_image = permit::permit_pre_image(&message, &config.domain())?;
            println!("{}", serde_json::to_string_pretty(&pre_image.to_hex())?);
        }
        Commands::TypeString { hash } => {
            let registry = permit::permit_registry()?;
            let type_string = eip712::encode_type(PERMIT_TRANSFER_TYPE, &registry)?;
            if hash {
                println!("{}", keccak256_hex(type_string.as_bytes()));
            } else {
                println!("{}", type_string);
            }
        }
        Commands::Address { key } => {
            let key = resolve_key(key)?;
            println!("{}", address_from_private_key(&key)?);
        }
    }

    Ok(())
}

fn resolve_key(key: Option<String>) -> Result<Zeroizing<String>> {
    key.or_else(|| std::env::var(ENV_PRIVATE_KEY).ok())
        .map(Zeroizing::new)
        .with_context(|| format!("no private key: pass --key or set {}", ENV_PRIVATE_KEY))
}

fn read_payload(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read message from stdin")?;
            Ok(buffer)
        }
    }
}

fn parse_message(payload: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(payload).context("message is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("message must be a JSON object"),
    }
}
