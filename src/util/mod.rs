//! Utility functions for common operations.
//!
//! - **URL validation**: API base and opener checks
//! - **Text processing**: Unicode-aware width, truncation and sanitizing of
//!   server-provided titles
//!
//! # Examples
//!
//! ```
//! use coursenav::util::{validate_base_url, truncate_to_width};
//!
//! let base = validate_base_url("https://api.example.com").unwrap();
//! assert_eq!(base.host_str(), Some("api.example.com"));
//!
//! let title = truncate_to_width("Rotational Motion - Lecture 04", 16);
//! assert_eq!(title, "Rotational Mo...");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, sanitize_title, truncate_to_width};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};

/// Maximum allowed search filter length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
