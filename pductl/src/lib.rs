//! pductl library
//!
//! Core functionality for the pductl command-line PDU client.
//!
//! # Public API
//!
//! The primary public API is [`client::PduClient`], which provides
//! programmatic access to a PDU's relay REST interface. Profile
//! configuration types are available via [`config::Profiles`].
//!
//! ```no_run
//! use pductl::client::PduClient;
//!
//! # async fn example() -> pdu_core::Result<()> {
//! let client = PduClient::new("192.0.2.10", "admin", "secret")?;
//!
//! for (index, outlet) in client.list_outlets().await?.iter().enumerate() {
//!     println!("{index}: {}", outlet.name);
//! }
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the PDU relay REST interface.
pub mod client;

/// Profile configuration for the CLI tool.
pub mod config;

/// HTTP Digest authentication (RFC 7616).
pub mod digest;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

#[cfg(test)]
pub mod test_utils;
