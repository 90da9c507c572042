//! Byte transports for a protocol session.
//!
//! A [`Link`] is a pair of channels: received chunks flow in through
//! `incoming`, response bytes flow out through `outgoing` to a writer task.
//! The writer task's handle is kept so the server can treat a failed
//! transmit as fatal.
//!
//! - [`Link::from_io`] - any tokio reader/writer pair (console, tests)
//! - [`console`] - stdin/stdout of the current process
//! - [`serial::open`] - a physical serial port (feature `serial`)
use anyhow::{anyhow, Result};
use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::logutil::escape_bytes;

#[cfg(feature = "serial")]
pub mod serial;

pub struct Link {
    pub name: String,
    pub incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    pub outgoing: mpsc::UnboundedSender<Vec<u8>>,
    pub writer: JoinHandle<Result<()>>,
}

impl Link {
    /// Wrap an async reader/writer pair. With `translate_newline`, `\n` from
    /// a line-buffered terminal is delivered as `\r`.
    pub fn from_io<R, W>(name: &str, reader: R, writer: W, translate_newline: bool) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(name.to_string(), reader, in_tx, translate_newline));
        let writer = tokio::spawn(write_loop(writer, out_rx));
        Link {
            name: name.to_string(),
            incoming: in_rx,
            outgoing: out_tx,
            writer,
        }
    }

    /// Hand bytes to the writer task.
    pub fn send(&self, bytes: Vec<u8>) -> Result<()> {
        self.outgoing
            .send(bytes)
            .map_err(|_| anyhow!("writer for link {} has stopped", self.name))
    }
}

/// Local terminal link over stdin/stdout.
pub fn console() -> Link {
    Link::from_io("console", tokio::io::stdin(), tokio::io::stdout(), true)
}

pub(crate) fn translate_newlines(chunk: &mut [u8]) {
    for b in chunk.iter_mut().filter(|b| **b == b'\n') {
        *b = b'\r';
    }
}

async fn read_loop<R>(
    name: String,
    mut reader: R,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    translate_newline: bool,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = [0u8; 256];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                debug!("Link {}: end of input", name);
                break;
            }
            Ok(n) => {
                let mut chunk = buffer[..n].to_vec();
                if translate_newline {
                    translate_newlines(&mut chunk);
                }
                trace!("Link {}: RX {}", name, escape_bytes(&chunk));
                if tx.send(chunk).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Link {}: read error: {}", name, e);
                break;
            }
        }
    }
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = rx.recv().await {
        writer
            .write_all(&bytes)
            .await
            .map_err(|e| anyhow!("transmit failed: {}", e))?;
        writer
            .flush()
            .await
            .map_err(|e| anyhow!("transmit flush failed: {}", e))?;
    }
    let _ = writer.shutdown().await;
    Ok(())
}
