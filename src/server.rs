//! # Protocol Server
//!
//! Drives one [`Session`] over one [`Link`]. Received chunks are fed to the
//! session byte by byte and every response is handed to the link's writer
//! before the next byte is processed, so the device never interleaves an
//! echo with an earlier line's answer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serialprot::config::Config;
//! use serialprot::outputs::OutputBank;
//! use serialprot::server::ProtocolServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let outputs = OutputBank::new(config.outputs.names.clone());
//!     let mut server = ProtocolServer::new(&config, "console", outputs);
//!     server.run(serialprot::link::console()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The loop ends when the link reaches end of input or on Ctrl-C. A failed
//! transmit ends it with an error.
use anyhow::{anyhow, Result};
use log::{debug, error, info};
use tokio::task::JoinError;

use crate::config::Config;
use crate::link::Link;
use crate::metrics;
use crate::outputs::OutputControl;
use crate::protocol::Session;

pub struct ProtocolServer<O> {
    session: Session<O>,
}

impl<O: OutputControl> ProtocolServer<O> {
    pub fn new(config: &Config, session_id: &str, outputs: O) -> Self {
        ProtocolServer {
            session: Session::new(session_id, &config.protocol, outputs),
        }
    }

    pub fn session(&self) -> &Session<O> {
        &self.session
    }

    /// Serve `link` until it closes, Ctrl-C arrives or transmission fails.
    pub async fn run(&mut self, mut link: Link) -> Result<()> {
        info!("Protocol session '{}' started on {}", self.session.id, link.name);
        if let Err(e) = link.send(self.session.prompt().to_vec()) {
            return Err(writer_stopped(&mut link, e).await);
        }

        loop {
            tokio::select! {
                chunk = link.incoming.recv() => {
                    match chunk {
                        Some(bytes) => {
                            if let Err(e) = self.handle_chunk(&link, &bytes) {
                                return Err(writer_stopped(&mut link, e).await);
                            }
                        }
                        None => {
                            info!("Link {} closed", link.name);
                            break;
                        }
                    }
                }

                result = &mut link.writer => {
                    let err = writer_failure(result);
                    error!("Link {}: {}", link.name, err);
                    return Err(err);
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(link).await
    }

    fn handle_chunk(&mut self, link: &Link, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            let out = self.session.feed(b);
            if !out.is_empty() {
                link.send(out)?;
            }
        }
        Ok(())
    }

    async fn shutdown(&mut self, link: Link) -> Result<()> {
        let Link {
            name,
            outgoing,
            writer,
            ..
        } = link;
        // Closing the channel lets the writer drain what is queued and exit
        drop(outgoing);
        match writer.await {
            Ok(Ok(())) => debug!("Link {}: writer drained", name),
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(anyhow!("writer task for {} failed: {}", name, e)),
        }

        let stats = metrics::snapshot();
        info!(
            "Session '{}' finished: lines={} acked={} nacked_grammar={} nacked_dispatch={} empty={} overflows={} erases={}",
            self.session.id,
            stats.lines(),
            stats.acked,
            stats.nacked_grammar,
            stats.nacked_dispatch,
            stats.empty,
            stats.overflows,
            stats.erases
        );
        Ok(())
    }
}

/// A send found the writer gone; its own result carries the cause.
async fn writer_stopped(link: &mut Link, send_error: anyhow::Error) -> anyhow::Error {
    debug!("Link {}: {}", link.name, send_error);
    let err = writer_failure((&mut link.writer).await);
    error!("Link {}: {}", link.name, err);
    err
}

fn writer_failure(result: std::result::Result<Result<()>, JoinError>) -> anyhow::Error {
    match result {
        Ok(Ok(())) => anyhow!("writer stopped unexpectedly"),
        Ok(Err(e)) => e,
        Err(e) => anyhow!("writer task failed: {}", e),
    }
}
