//! Remote catalog API.
//!
//! - [`CatalogClient`] - typed GET requests for every catalog level
//! - [`CatalogNode`] / [`MediaItem`] - listing entries
//! - [`batch_id_from_url`] - batch id extraction for today's classes

mod client;
mod types;

pub use client::{
    batch_id_from_url, ApiError, CatalogClient, ClientOptions, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_TIMEOUT,
};
pub use types::{CatalogNode, MediaItem};
