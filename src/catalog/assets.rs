//! Sanitized keys for static asset lookups under the catalog root

use crate::error::CatalogError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Relative path that is safe to join under a fixed root
///
/// Built only from plain segments: no `..`, `.`, empty segments, separators
/// or NUL bytes inside a segment, so [`AssetKey::resolve`] can never escape
/// the root it is joined to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    segments: Vec<String>,
}

impl AssetKey {
    /// Parse a URL-encoded key as received from a client
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let decoded = urlencoding::decode(raw)
            .map_err(|_| CatalogError::InvalidAssetKey(raw.to_string()))?;

        Self::from_segments(decoded.split('/').map(str::to_string))
    }

    /// Build a key from already-decoded path segments
    pub fn from_segments<I>(segments: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = String>,
    {
        let segments: Vec<String> = segments.into_iter().collect();

        if segments.is_empty() || !segments.iter().all(|s| is_plain_segment(s)) {
            return Err(CatalogError::InvalidAssetKey(segments.join("/")));
        }

        Ok(Self { segments })
    }

    /// Absolute path of this asset under `root`
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }

    /// URL-encoded form, one encoded segment per path component
    pub fn encoded(&self) -> String {
        self.segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// True for a single normal file-name component
pub(crate) fn is_plain_segment(segment: &str) -> bool {
    if segment.is_empty() || segment == "." || segment == ".." {
        return false;
    }
    if segment.contains(['/', '\\', '\0']) {
        return false;
    }
    // Rejects Windows drive prefixes such as `C:`
    !segment.contains(':')
}
