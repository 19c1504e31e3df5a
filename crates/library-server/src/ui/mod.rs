//! Server-rendered presentation layer.

pub mod handlers;
pub mod render;
pub mod state;

pub use state::{Banner, BannerKind, View, ViewState};
