//! Media resolution and player handoff.
//!
//! - [`MediaResolver`] - classifies a content URL and calls the lookup
//!   endpoint when needed
//! - [`PlaybackDescriptor`] - external link, live stream, or DRM stream
//! - [`player_url`] - encodes a descriptor for the companion player page

mod descriptor;
mod handoff;
mod resolver;

pub use descriptor::PlaybackDescriptor;
pub use handoff::player_url;
pub use resolver::{decode_media_response, is_external_link, MediaResolver, ResolveError};
