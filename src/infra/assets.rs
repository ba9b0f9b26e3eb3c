//! Disk-backed static asset serving rooted at the configured public directory.

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StaticAssetError {
    #[error("invalid asset path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StaticAssetError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InvalidPath => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
        }
    }
}

/// Filesystem-backed asset store. Files are served verbatim; directory
/// listings and traversal outside the root are refused.
#[derive(Debug)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Read the asset at the given request path into memory.
    pub async fn read(&self, path: &str) -> Result<Bytes, StaticAssetError> {
        let absolute = self.resolve(path)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StaticAssetError> {
        let candidate = path.trim_start_matches('/');
        if candidate.is_empty() || candidate.ends_with('/') {
            return Err(StaticAssetError::InvalidPath);
        }

        let relative = Path::new(candidate);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StaticAssetError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

/// Build the response for a resolved asset: guessed content type, explicit
/// length, and long-lived caching headers.
pub fn asset_response(path: &str, bytes: Bytes) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let len = bytes.len();

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StaticAssets {
        StaticAssets::new(PathBuf::from("public"))
    }

    #[test]
    fn resolve_joins_below_the_root() {
        let resolved = store().resolve("stylesheets/style.css").expect("valid path");
        assert_eq!(resolved, Path::new("public/stylesheets/style.css"));
    }

    #[test]
    fn resolve_strips_leading_slash() {
        let resolved = store().resolve("/robots.txt").expect("valid path");
        assert_eq!(resolved, Path::new("public/robots.txt"));
    }

    #[test]
    fn traversal_and_directory_requests_are_refused() {
        for path in ["../Cargo.toml", "a/../../etc/passwd", "", "stylesheets/"] {
            assert!(
                matches!(store().resolve(path), Err(StaticAssetError::InvalidPath)),
                "{path}"
            );
        }
    }

    #[test]
    fn asset_response_sets_type_length_and_caching() {
        let response = asset_response("stylesheets/style.css", Bytes::from_static(b"body {}"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "7"
        );
        assert!(response.headers().contains_key(header::CACHE_CONTROL));
    }
}
