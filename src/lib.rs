//! A small blocking Rust client for the Weather Underground current-conditions API.
//!
//! This crate implements a fetch-parse-notify flow:
//! request the current conditions for a location, decode the weather fields
//! that are present, then hand each one to the callback registered for it.
//! The same cycle can run on a background thread at a fixed interval.
//!
//! ## Quick start
//! - Configure the API key via `WUNDERGROUND_API_KEY` or a `.wunderground_key` file
//!   (supported in the current directory and in your home directory), or pass it
//!   to [`Client::new`].
//! - Register callbacks and call [`Client::fetch_and_dispatch`] once, or
//!   [`Client::start_poll`] to repeat it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wunderground::{Callbacks, Client, Result};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!     let callbacks = Arc::new(
//!         Callbacks::default()
//!             .on_temperature(|t, _| println!("{:.1} C / {:.1} F", t.celsius, t.fahrenheit))
//!             .on_condition(|text, _| println!("{text}")),
//!     );
//!
//!     client.fetch_and_dispatch(&callbacks, "DE/Berlin")?;
//!
//!     let every = Duration::from_secs(600);
//!     let poll = client.start_poll(Arc::clone(&callbacks), "DE/Berlin", every)?;
//!     std::thread::sleep(Duration::from_secs(1800));
//!     poll.stop()?;
//!     Ok(())
//! }
//! ```
//!
//! Logging goes through `tracing`; install a subscriber to see it.

#![forbid(unsafe_code)]

mod callbacks;
mod client;
mod conditions;
mod config;
mod error;
mod poller;
mod units;
mod util;

#[cfg(test)]
mod test_support;

pub use callbacks::Callbacks;
pub use client::Client;
pub use conditions::{Conditions, FieldKind, Temperature, Wind};
pub use config::{ClientConfig, DEFAULT_TIMEOUT, DEFAULT_URL, read_key_file};
pub use error::{Error, ParseError, Result, TransportErrorKind};
pub use poller::{PollHandle, PollState, TimeUnit, daily, hourly, minutely};
pub use units::Units;
