//! # Serialprot - Line-Oriented Command Protocol over Serial Links
//!
//! Serialprot answers a small text command protocol typed on a serial
//! terminal. Each line has the shape `#name,param1:param2<CR>`; the service
//! echoes keystrokes, applies backspace editing, and answers every completed
//! line with an ACK (optionally carrying a `#a,<value>` result) or a NACK.
//!
//! ## Features
//!
//! - **Per-byte line editing**: echo, DEL as visual backspace, bell on an empty line, overflow notice when the line exceeds its capacity.
//! - **Strict frame grammar**: fixed `#`, `,`, `:` and CR positions, 3-letter names, parameters of at most 4 characters.
//! - **Typed dispatch**: parameters are classified as numeric or alphabetic and routed to `rdm`, `add`, `asc` or `gpo`.
//! - **Injected outputs**: `gpo` switches named outputs through the [`outputs::OutputControl`] trait.
//! - **Transports**: a physical serial port (feature `serial`) or the local console.
//!
//! ## Quick Start
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
//!
//!     let link = serialprot::link::console();
//!     let mut server = ProtocolServer::new(&config, "console", outputs);
//!     server.run(link).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`protocol`] - line accumulation, frame parsing, classification, dispatch and responses
//! - [`outputs`] - output states and the control capability used by `gpo`
//! - [`link`] - serial and console byte transports
//! - [`server`] - async loop tying a session to a link
//! - [`config`] - configuration management and validation
//! - [`logutil`] / [`metrics`] - log escaping and process counters
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ ProtocolServer  │ ← select loop, shutdown
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │    Session      │ ← synchronous protocol engine
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Link / Outputs │ ← transport and side effects
//! └─────────────────┘
//! ```

pub mod config;
pub mod link;
pub mod logutil;
pub mod metrics;
pub mod outputs;
pub mod protocol;
pub mod server;
