use thiserror::Error;
use url::Url;

/// File hosts accepted for suggested download links regardless of scheme.
pub const ALLOWED_DOWNLOAD_HOSTS: [&str; 7] = [
    "mediafire.com",
    "drive.google.com",
    "mega.nz",
    "dropbox.com",
    "github.com",
    "sourceforge.net",
    "gitlab.com",
];

/// Errors from validating a URL before handing it to the browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Validate a catalog or modal link before opening it in the browser.
///
/// Only `http` and `https` links are opened; `file:`, `javascript:` and the
/// like are rejected.
///
/// # Errors
///
/// Returns [`UrlValidationError`] if the URL cannot be parsed or its scheme
/// is not `http`/`https`.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// True if `host` is one of [`ALLOWED_DOWNLOAD_HOSTS`] or a subdomain of one.
pub fn is_allowed_download_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    ALLOWED_DOWNLOAD_HOSTS.iter().any(|allowed| {
        host == *allowed
            || host
                .strip_suffix(allowed)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
