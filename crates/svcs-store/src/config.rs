//! Per-store configuration and the on-disk format marker.
//!
//! Every store records its configuration in `<root>/store.toml`:
//!
//! ```toml
//! version = 1
//! algorithm = "sha1"
//! layout = "flat"
//! ```
//!
//! The marker makes digests self-describing: a reader can tell which hash
//! function named the files under `objects/` without guessing from lengths.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use svcs_types::HashAlgorithm;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};

/// File name of the format marker under the store root.
pub const MARKER_FILE: &str = "store.toml";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// How object files are laid out under `objects/`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `objects/<digest>`.
    #[default]
    Flat,
    /// `objects/<first 2 hex chars>/<remaining hex chars>`.
    Sharded,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Sharded => write!(f, "sharded"),
        }
    }
}

/// Configuration fixed when a store is first created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Hash function naming every object.
    pub algorithm: HashAlgorithm,
    /// Directory layout under `objects/`.
    pub layout: Layout,
}

impl StoreConfig {
    /// Configuration with the given algorithm and the flat layout.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            layout: Layout::Flat,
        }
    }

    /// Same configuration with a different layout.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Read the configuration recorded under `root` without creating
    /// anything. Returns `Ok(None)` if no store has been initialized there.
    pub fn load(root: impl AsRef<Path>) -> StoreResult<Option<Self>> {
        load(root.as_ref())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FormatMarker {
    version: u32,
    algorithm: HashAlgorithm,
    layout: Layout,
}

pub(crate) fn marker_path(root: &Path) -> PathBuf {
    root.join(MARKER_FILE)
}

/// Load the marker under `root`, if one exists.
pub(crate) fn load(root: &Path) -> StoreResult<Option<StoreConfig>> {
    let path = marker_path(root);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::init(&path, e)),
    };
    let marker: FormatMarker =
        toml::from_str(&text).map_err(|e| StoreError::init(&path, format!("malformed marker: {e}")))?;
    if marker.version != FORMAT_VERSION {
        return Err(StoreError::init(
            &path,
            format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                marker.version
            ),
        ));
    }
    Ok(Some(StoreConfig {
        algorithm: marker.algorithm,
        layout: marker.layout,
    }))
}

/// Create a temporary file in `dir` for staging a write.
///
/// Created with mode 0666 (less the umask) rather than `tempfile`'s 0600.
pub(crate) fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Write the marker for `config` under `root` without replacing an existing
/// one. Returns an `AlreadyExists` error if another writer got there first.
pub(crate) fn persist(root: &Path, config: &StoreConfig) -> io::Result<()> {
    let marker = FormatMarker {
        version: FORMAT_VERSION,
        algorithm: config.algorithm,
        layout: config.layout,
    };
    let text = toml::to_string(&marker).map_err(io::Error::other)?;

    let mut tmp = staging_file(root)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(marker_path(root))
        .map(|_| ())
        .map_err(|e| e.error)
}
