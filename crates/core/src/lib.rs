//! VTU Dashboard Core - Shared types library.
//!
//! This crate provides the types shared by the dashboard's client-side state
//! layer and its tooling:
//! - `client` - Session codec, storage backends and the client state store
//! - `cli` - Command-line front end driving the store over a file
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations on them - no I/O,
//! no cryptography, no clocks. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, user sessions, cart and wishlist snapshots,
//!   verification slips, product records and amount helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
