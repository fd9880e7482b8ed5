//! Load bot for the social API: signs up synthetic users, has each of them
//! create posts and like random existing posts.
pub mod client;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod scenario;
pub mod session;
pub mod statistics;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, HttpClient, RawResponse, Transport};
pub use config::{BotConfig, FailurePolicy, RunSettings};
pub use error::{ApiError, BotError, ConfigError, RunError, TransportError};
pub use scenario::{run_from_settings, Bot};
pub use session::Session;
pub use statistics::RunSummary;
