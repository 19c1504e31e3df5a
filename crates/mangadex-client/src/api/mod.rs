//! MangaDex API v5 client implementation.
//!
//! This module provides a timeout-bounded client for the public MangaDex
//! catalog: title search, manga details, and cover file lookup.

pub mod client;
pub mod types;

pub use client::MangaDexClient;
pub use types::*;
