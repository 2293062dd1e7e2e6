//! Utility functions shared by the UI and the suggestion form.
//!
//! - **URL validation**: which links may be opened or suggested
//! - **Text processing**: Unicode-aware width, truncation and sanitizing

mod text;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width};
pub use url_validator::{
    is_allowed_download_host, validate_url_for_open, UrlValidationError, ALLOWED_DOWNLOAD_HOSTS,
};

/// Maximum allowed search term length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
