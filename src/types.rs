//! Shared types passed between the resolve, assemble and host stages.

use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// A template file found for the current pass, with the key it is cached under.
///
/// Only the location is kept: contents are read while rendering, fresh on
/// every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Path as produced by the resolver (pattern match or list entry).
    pub path: PathBuf,
    /// Cache key, e.g. `tpl/home.html` or `./views/home.html`.
    pub url: String,
}

/// A named artifact handed to the build host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name relative to the host's output location.
    pub filename: String,
    pub content: String,
}

impl Asset {
    /// Size reported to the host, in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// SHA-256 of the content as a hex string.
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(self.content.as_bytes()))
    }
}
