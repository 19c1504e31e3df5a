//! MangaDex catalog client for the manga library tracker.
//!
//! This library searches the MangaDex API, resolves cover images, and
//! normalizes the multi-locale upstream records into a flat summary shape.

pub mod api;
pub mod error;
pub mod normalizer;
pub mod source;

pub use api::{MangaDexClient, MangaSummary, RawManga};
pub use error::UpstreamError;
pub use normalizer::Normalizer;
pub use source::CatalogSource;
