use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use tokio::time::{Duration, timeout};
use tracing_subscriber::EnvFilter;

use sleeve_core::models::catalog;
use sleeve_core::{Codec, Envelope};

#[derive(Parser)]
#[command(name = "sleeve")]
#[command(about = "Decode and re-encode polymorphic resource envelopes", long_about = None)]
struct Cli {
    /// Upper bound for a single decode / encode (milliseconds)
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a document and print what was recognised
    Decode {
        /// Envelope kind, e.g. stream_analytics.output
        #[arg(long)]
        kind: String,
        /// JSON document (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Decode a document and write it back out
    Encode {
        #[arg(long)]
        kind: String,
        file: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// List envelope kinds and their discriminators
    Kinds,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
}

async fn run(cli: Cli) -> Result<()> {
    let codec = Arc::new(catalog::codec().context("building codec")?);
    let limit = Duration::from_millis(cli.timeout_ms);
    tracing::debug!(kinds = codec.kinds().len(), timeout_ms = cli.timeout_ms, "codec ready");

    match cli.command {
        Commands::Decode { kind, file } => {
            let input = read_input(file.as_deref())?;
            tracing::debug!(kind = %kind, bytes = input.len(), "decoding");
            let envelope = with_deadline(limit, codec.clone(), move |codec| {
                Ok(codec.decode(&kind, &input)?)
            })
            .await?;
            print_json(&summary(&envelope), true)
        }
        Commands::Encode { kind, file, pretty } => {
            let input = read_input(file.as_deref())?;
            tracing::debug!(kind = %kind, bytes = input.len(), "re-encoding");
            let value = with_deadline(limit, codec.clone(), move |codec| {
                let envelope = codec.decode(&kind, &input)?;
                Ok(codec.encode_value(&kind, &envelope)?)
            })
            .await?;
            print_json(&value, pretty)
        }
        Commands::Kinds => {
            let mut out = io::stdout().lock();
            for name in codec.kinds() {
                let discriminators = codec
                    .registry(&name)
                    .map(|r| r.discriminators())
                    .unwrap_or_default();
                let passthrough = codec.kind(&name).is_some_and(|k| k.allows_passthrough());
                write!(out, "{name}: {}", discriminators.join(", "))?;
                if passthrough {
                    write!(out, " (passthrough)")?;
                }
                writeln!(out)?;
            }
            Ok(())
        }
    }
}

/// codec 呼び出しを blocking pool で実行し、期限を超えたら諦める
async fn with_deadline<T, F>(limit: Duration, codec: Arc<Codec>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Codec) -> Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || f(&codec));
    match timeout(limit, task).await {
        Ok(joined) => joined.context("codec task panicked")?,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "codec call exceeded its deadline");
            Err(anyhow!("timed out after {}ms", limit.as_millis()))
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn summary(envelope: &Envelope) -> Value {
    let slot = envelope.slot().map(|slot| {
        let unknown = slot.unknown_fields().paths();
        json!({
            "discriminator": slot.discriminator(),
            "opaque": slot.is_opaque(),
            "unknownFields": unknown,
        })
    });
    let fields: Map<String, Value> = envelope.fields().clone();
    json!({
        "fields": fields,
        "slot": slot,
    })
}
