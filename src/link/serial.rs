//! Physical serial port transport.
//!
//! The port is opened 8N1 with a short read timeout and cloned into two
//! handles: one for a blocking reader loop and one for a blocking writer
//! loop, each on its own `spawn_blocking` thread.
use anyhow::{anyhow, Result};
use log::{debug, error, info, trace, warn};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

use super::Link;
use crate::logutil::escape_bytes;

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Open `port_name` and start the reader/writer threads.
pub async fn open(port_name: &str, baud_rate: u32) -> Result<Link> {
    let port = open_port(port_name, baud_rate).await?;
    let reader_port = port
        .try_clone()
        .map_err(|e| anyhow!("Failed to clone serial port {}: {}", port_name, e))?;

    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let name = port_name.to_string();
    tokio::task::spawn_blocking(move || read_blocking(name, reader_port, in_tx));
    let writer = tokio::task::spawn_blocking(move || write_blocking(port, out_rx));

    info!("Serial link open on {} at {} baud", port_name, baud_rate);
    Ok(Link {
        name: port_name.to_string(),
        incoming: in_rx,
        outgoing: out_tx,
        writer,
    })
}

async fn open_port(port_name: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>> {
    debug!("Opening serial port {} at {} baud", port_name, baud_rate);

    let builder = serialport::new(port_name, baud_rate)
        .timeout(READ_TIMEOUT)
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .flow_control(serialport::FlowControl::None);
    let mut port = builder
        .open()
        .map_err(|e| anyhow!("Failed to open serial port {}: {}", port_name, e))?;

    // Some USB-UART bridges only pass data once DTR/RTS are raised
    let _ = port.write_data_terminal_ready(true);
    let _ = port.write_request_to_send(true);
    sleep(Duration::from_millis(150)).await;

    // Discard anything the device printed before we attached
    if let Ok(stale) = port.bytes_to_read() {
        if stale > 0 {
            debug!("Discarding {} stale bytes on {}", stale, port_name);
            let _ = port.clear(serialport::ClearBuffer::Input);
        }
    }
    Ok(port)
}

fn read_blocking(name: String, mut port: Box<dyn SerialPort>, tx: mpsc::UnboundedSender<Vec<u8>>) {
    let mut buffer = [0u8; 256];
    loop {
        if tx.is_closed() {
            break;
        }
        match port.read(&mut buffer) {
            Ok(n) if n > 0 => {
                trace!("Serial {}: RX {}", name, escape_bytes(&buffer[..n]));
                if tx.send(buffer[..n].to_vec()).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                error!("Serial {}: read failed: {}", name, e);
                break;
            }
        }
    }
    debug!("Serial {}: reader stopped", name);
}

fn write_blocking(
    mut port: Box<dyn SerialPort>,
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
) -> Result<()> {
    while let Some(bytes) = rx.blocking_recv() {
        if let Err(e) = port.write_all(&bytes).and_then(|_| port.flush()) {
            warn!("Serial transmit of {} bytes failed", bytes.len());
            return Err(anyhow!("transmit failed: {}", e));
        }
    }
    Ok(())
}
