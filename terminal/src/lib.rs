//! Bridgesync Terminal - headless front-end for the bridge sync client.
//!
//! Reads trading commands from stdin and logs market data, positions,
//! connection changes and command outcomes as they arrive.
//!
//! # Components
//!
//! - [`config`]: Environment configuration
//! - [`commands`]: Line command parser
//! - [`render`]: Store summaries for log output
//! - [`service`]: Main terminal service

pub mod commands;
pub mod config;
pub mod render;
pub mod service;

pub use commands::{OrderArgs, ParseError, TerminalCommand};
pub use config::{ConfigError, TerminalConfig};
pub use service::{Flow, TerminalService};
