//!
//! src/lib.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Playlist loader: searches spotify for playlists, flattens their tracks
//! into rows and appends them to a bigquery table
//!

pub mod auth;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod table;
pub mod types;

pub use crate::errors::LoaderError;
