//! Twitter account age and milestone tracker.
//!
//! The calculations ([`age`], [`anniversary`], [`milestone`], [`stats`]) are
//! pure functions over instants and counts. The rest of the crate is the web
//! app around them: OAuth 1.0a sign-in with Twitter, the profile fetch, and
//! the rendered pages.

pub mod age;
pub mod anniversary;
pub mod card;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod milestone;
pub mod oauth;
pub mod render;
pub mod router;
pub mod server;
pub mod state;
pub mod stats;
pub mod telemetry;
pub mod twitter;
