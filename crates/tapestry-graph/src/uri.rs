//! URI and path conversion utilities.
//!
//! Converts between file system paths and `file://` URIs using the `url`
//! crate, which handles percent-encoding and platform path formats.

use camino::{Utf8Path, Utf8PathBuf};
use lsp_types::Uri;
use url::Url;

use crate::error::GraphError;

/// Converts a `file://` URI to a `Utf8PathBuf`.
///
/// URIs that are not valid file URLs fall back to stripping the scheme.
#[must_use]
pub fn uri_to_path(uri: &Uri) -> Utf8PathBuf {
    let uri_str = uri.as_str();

    if let Some(path) = try_parse_uri_to_path(uri_str) {
        return path;
    }

    uri_str
        .strip_prefix("file://")
        .map_or_else(|| Utf8PathBuf::from(uri_str), Utf8PathBuf::from)
}

fn try_parse_uri_to_path(uri_str: &str) -> Option<Utf8PathBuf> {
    let url = Url::parse(uri_str).ok()?;
    let path = url.to_file_path().ok()?;
    Utf8PathBuf::try_from(path).ok()
}

/// Converts an absolute path to a `file://` URI.
///
/// # Errors
///
/// Returns a `GraphError` if the path is relative or otherwise cannot be
/// expressed as a URI.
pub fn path_to_uri(path: &Utf8Path) -> Result<Uri, GraphError> {
    let url = Url::from_file_path(path.as_std_path()).map_err(|()| {
        GraphError::io(
            format!("failed to convert path to URI: {path}"),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid path"),
        )
    })?;

    url.as_str().parse().map_err(|_| {
        GraphError::io(
            format!("failed to parse URI: {}", url.as_str()),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid URI"),
        )
    })
}
