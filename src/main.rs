//! Binary entrypoint for the serialprot CLI.
//!
//! Commands:
//! - `start [--port <path>] [--baud <rate>] [--console]` - serve the protocol on a serial port or the local terminal
//! - `init` - write a starter `config.toml`
//! - `eval <line> [--json]` - run one line through an offline session and print the response
//!
//! See the library crate docs for module-level details: `serialprot::`.
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::Path;

use serialprot::config::Config;
use serialprot::link::{self, Link};
use serialprot::logutil::{escape_bytes, escape_log};
use serialprot::outputs::OutputBank;
use serialprot::protocol::{LineOutcome, Session};
use serialprot::server::ProtocolServer;

#[derive(Parser)]
#[command(name = "serialprot")]
#[command(about = "Line-oriented command protocol service for serial terminals")]
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
    /// Serve the protocol
    Start {
        /// Serial device (e.g., /dev/ttyACM0); overrides the config file
        #[arg(short, long)]
        port: Option<String>,

        /// Baud rate; overrides the config file
        #[arg(short, long)]
        baud: Option<u32>,

        /// Use stdin/stdout instead of a serial port
        #[arg(long, conflicts_with = "port")]
        console: bool,
    },
    /// Write a default configuration file
    Init,
    /// Evaluate a single protocol line offline
    Eval {
        /// Line to evaluate; a trailing carriage return is added if missing
        line: String,

        /// Print a JSON summary instead of the raw response
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            port,
            baud,
            console,
        } => {
            let mut config = load_or_default(&cli.config).await?;
            if let Some(p) = port {
                config.serial.port = p;
            }
            if let Some(b) = baud {
                config.serial.baud_rate = b;
            }
            config.validate()?;
            init_logging(Some(&config), cli.verbose);
            info!("Starting serialprot v{}", env!("CARGO_PKG_VERSION"));

            let link = if console {
                link::console()
            } else {
                open_serial(&config).await?
            };
            let outputs = OutputBank::new(config.outputs.names.clone());
            let session_id = link.name.clone();
            let mut server = ProtocolServer::new(&config, &session_id, outputs);
            server.run(link).await?;
        }
        Commands::Init => {
            init_logging(None, cli.verbose);
            if Path::new(&cli.config).exists() {
                warn!("Overwriting existing configuration at {}", cli.config);
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Eval { line, json } => {
            let config = load_or_default(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let accepted = eval_line(&config, &line, json)?;
            if !accepted {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load the config file, or fall back to defaults when it does not exist.
async fn load_or_default(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::load(path).await
    } else {
        eprintln!(
            "No configuration at {} (run `serialprot init`); using defaults.",
            path
        );
        Ok(Config::default())
    }
}

#[cfg(feature = "serial")]
async fn open_serial(config: &Config) -> Result<Link> {
    link::serial::open(&config.serial.port, config.serial.baud_rate).await
}

#[cfg(not(feature = "serial"))]
async fn open_serial(_config: &Config) -> Result<Link> {
    bail!("Serial support requires the 'serial' feature; use --console instead")
}

/// Run `input` through a fresh session. Returns whether the line was
/// acknowledged (an empty line counts as accepted).
fn eval_line(config: &Config, input: &str, json: bool) -> Result<bool> {
    let mut line = input.to_string();
    if !line.ends_with('\r') {
        line.push('\r');
    }
    if line[..line.len() - 1].contains('\r') {
        bail!("eval takes a single line");
    }

    let outputs = OutputBank::new(config.outputs.names.clone());
    let mut session = Session::new("eval", &config.protocol, outputs);
    let transcript: Vec<u8> = line.bytes().flat_map(|b| session.feed(b)).collect();
    // No outcome after the final CR means the line overflowed
    let outcome = session.last_outcome().cloned();

    let accepted = matches!(
        outcome,
        Some(LineOutcome::Empty) | Some(LineOutcome::Ack { .. })
    );

    if json {
        let mut payload = serde_json::json!({
            "line": escape_log(&line),
            "response": escape_bytes(&transcript),
        });
        match &outcome {
            None => {
                payload["outcome"] = "overflow".into();
                payload["capacity"] = config.protocol.buffer_capacity.into();
            }
            Some(LineOutcome::Empty) => payload["outcome"] = "empty".into(),
            Some(LineOutcome::Ack { kind, reply }) => {
                payload["outcome"] = "ack".into();
                payload["kind"] = serde_json::to_value(kind)?;
                payload["command"] = reply.command.into();
                payload["value"] = serde_json::to_value(&reply.value)?;
            }
            Some(LineOutcome::Nack(e)) => {
                payload["outcome"] = "nack".into();
                payload["error"] = e.class().into();
                payload["reason"] = e.to_string().into();
            }
        }
        println!("{}", payload);
    } else {
        println!("{}", escape_bytes(&transcript));
    }
    Ok(accepted)
}

fn init_logging(config: Option<&Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only in the foreground
        let is_tty = atty::is(atty::Stream::Stdout);
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
