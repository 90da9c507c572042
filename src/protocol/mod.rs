//! # Protocol Engine
//!
//! Incremental assembly, validation, classification and dispatch of
//! `#name,param1:param2<CR>` command lines received one byte at a time.
//!
//! ## Components
//!
//! - [`buffer`] - capacity-bounded line storage
//! - [`accumulator`] - per-byte line assembly (echo, erase, overflow)
//! - [`frame`] - grammar check and field split
//! - [`kind`] - numeric/alphabetic parameter classification
//! - [`command`] - built-in command table keyed by (kind, name)
//! - [`dispatch`] - handler execution, including the output capability
//! - [`response`] - ACK/NACK/overflow text
//! - [`session`] - ties the above together for one link
//!
//! ## Data Flow
//!
//! ```text
//! byte ─► Accumulator ─(CR)─► frame::parse ─► kind::classify
//!                                                   │
//!             bytes out ◄── ResponseFormat ◄── Dispatcher ─► OutputControl
//! ```
//!
//! Everything here is synchronous, allocation-light and free of I/O, so a
//! session can be driven from any transport.

pub mod accumulator;
pub mod buffer;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod kind;
pub mod response;
pub mod session;

pub use error::{ParseError, ProtocolError};
pub use frame::Frame;
pub use kind::MessageKind;
pub use session::{LineOutcome, Session};
