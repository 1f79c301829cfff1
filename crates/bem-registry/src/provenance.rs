//! Where a loaded module came from.
//!
//! [`LocalRegistry`](crate::LocalRegistry) stamps every module it reads with
//! the manifest path and its SHA-256, and the composer carries those stamps
//! into the [`ComposedSpecification`](crate::ComposedSpecification), so a
//! resolution can be tied to the exact library revision it used.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ManifestDigest(String);

impl ManifestDigest {
    pub fn of(data: &[u8]) -> Self {
        ManifestDigest(format!("{:x}", Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading twelve hex digits, as shown in listings.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A manifest path, relative to the library root, and its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub path: String,
    pub sha256: ManifestDigest,
}

impl Provenance {
    pub fn new(path: impl Into<String>, manifest: &[u8]) -> Self {
        Provenance {
            path: path.into(),
            sha256: ManifestDigest::of(manifest),
        }
    }
}
