//! Directory-backed object store.
//!
//! On-disk layout:
//! ```text
//! <root>/
//!   store.toml          format marker (version, algorithm, layout)
//!   objects/<digest>    one file per object (flat layout)
//!   objects/ab/cdef...  one file per object (sharded layout)
//!   tmp/                staging area for in-flight writes
//! ```
//!
//! Writes go to a temporary file under `tmp/` and are then renamed into
//! `objects/` without replacing an existing file, so no partially written
//! object is ever visible and concurrent writers of the same content race
//! harmlessly.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use svcs_crypto::ContentHasher;
use svcs_types::{HashAlgorithm, ObjectId};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{self, Layout, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

const OBJECTS_DIR: &str = "objects";
const TMP_DIR: &str = "tmp";

/// Outcome of [`FsObjectStore::fsck`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FsckReport {
    /// Number of objects re-hashed.
    pub checked: usize,
    /// Objects whose content no longer matches their name.
    pub corrupt: Vec<ObjectId>,
}

impl FsckReport {
    /// Returns `true` if no corrupt objects were found.
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Object store rooted at a directory on the local filesystem.
///
/// The handle holds no mutable state; clone it or share it behind an `Arc`
/// across threads. Other processes may use the same root concurrently.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
    objects_dir: PathBuf,
    tmp_dir: PathBuf,
    config: StoreConfig,
    hasher: ContentHasher,
}

impl FsObjectStore {
    /// Open the store at `root`, creating it with the default configuration
    /// if it does not exist yet.
    ///
    /// An existing store keeps whatever configuration its marker records.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::init(root.as_ref(), None)
    }

    /// Open the store at `root` with an explicit configuration.
    ///
    /// Fails with [`StoreError::StorageInit`] if the store already exists
    /// with a different configuration.
    pub fn open_with(root: impl AsRef<Path>, config: StoreConfig) -> StoreResult<Self> {
        Self::init(root.as_ref(), Some(config))
    }

    fn init(root: &Path, requested: Option<StoreConfig>) -> StoreResult<Self> {
        match fs::metadata(root) {
            Ok(meta) if !meta.is_dir() => {
                return Err(StoreError::init(root, "path exists and is not a directory"));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::init(root, e)),
        }
        fs::create_dir_all(root).map_err(|e| StoreError::init(root, e))?;

        let config = settle_config(root, requested)?;

        let objects_dir = root.join(OBJECTS_DIR);
        let tmp_dir = root.join(TMP_DIR);
        for dir in [&objects_dir, &tmp_dir] {
            fs::create_dir_all(dir).map_err(|e| StoreError::init(dir, e))?;
        }

        info!(
            root = %root.display(),
            algorithm = %config.algorithm,
            layout = %config.layout,
            "opened object store"
        );

        Ok(Self {
            root: root.to_path_buf(),
            objects_dir,
            tmp_dir,
            config,
            hasher: ContentHasher::new(config.algorithm),
        })
    }

    /// The root directory passed to `open`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `objects` directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Configuration recorded for this store.
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Where the object named `id` lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        match self.config.layout {
            Layout::Flat => self.objects_dir.join(hex),
            Layout::Sharded => self.objects_dir.join(&hex[..2]).join(&hex[2..]),
        }
    }

    /// Read an object named by an arbitrary string.
    ///
    /// A string that is not a well-formed digest for this store's algorithm
    /// cannot name an object and yields [`StoreError::ObjectNotFound`]; it is
    /// never turned into a path.
    pub fn read_hex(&self, digest: &str) -> StoreResult<Vec<u8>> {
        let id = ObjectId::parse_for(self.config.algorithm, digest)
            .map_err(|_| StoreError::ObjectNotFound(digest.to_string()))?;
        self.read(&id)
    }

    /// Existence check for an arbitrary string; malformed digests are absent.
    pub fn exists_hex(&self, digest: &str) -> StoreResult<bool> {
        match ObjectId::parse_for(self.config.algorithm, digest) {
            Ok(id) => self.exists(&id),
            Err(_) => Ok(false),
        }
    }

    /// Every object currently stored, sorted.
    ///
    /// Files under `objects/` whose names are not digests for this store's
    /// algorithm are skipped.
    pub fn list(&self) -> StoreResult<Vec<ObjectId>> {
        let depth = match self.config.layout {
            Layout::Flat => 1,
            Layout::Sharded => 2,
        };
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.objects_dir).min_depth(1).max_depth(depth) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.objects_dir.as_path()).to_path_buf();
                StoreError::read(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            match self.id_from_path(entry.path()) {
                Some(id) => ids.push(id),
                None => warn!(path = %entry.path().display(), "skipping foreign file in objects"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Re-hash every stored object and report the ones that no longer match
    /// their names. Corruption is reported, not raised.
    pub fn fsck(&self) -> StoreResult<FsckReport> {
        let mut report = FsckReport::default();
        for id in self.list()? {
            match self.read_verified(&id) {
                Ok(_) => {}
                Err(StoreError::Integrity { id, computed }) => {
                    warn!(%id, %computed, "corrupt object");
                    report.corrupt.push(id);
                }
                Err(e) => return Err(e),
            }
            report.checked += 1;
        }
        debug!(checked = report.checked, corrupt = report.corrupt.len(), "fsck complete");
        Ok(report)
    }

    fn id_from_path(&self, path: &Path) -> Option<ObjectId> {
        let rel = path.strip_prefix(&self.objects_dir).ok()?;
        let hex: String = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?
            .concat();
        let id = ObjectId::parse_for(self.config.algorithm, &hex).ok()?;
        // Reject uppercase or otherwise non-canonical names.
        (self.object_path(&id) == path).then_some(id)
    }

    fn write_err(id: ObjectId) -> impl FnOnce(io::Error) -> StoreError {
        move |source| StoreError::StorageWrite { id, source }
    }
}

impl ObjectStore for FsObjectStore {
    fn algorithm(&self) -> HashAlgorithm {
        self.config.algorithm
    }

    fn hash(&self, data: &[u8]) -> ObjectId {
        self.hasher.hash(data)
    }

    fn write(&self, data: &[u8]) -> StoreResult<ObjectId> {
        let id = self.hasher.hash(data);
        let path = self.object_path(&id);

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                debug!(%id, "object already present");
                return Ok(id);
            }
            Ok(_) => {
                return Err(Self::write_err(id)(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a file", path.display()),
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Self::write_err(id)(e)),
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Self::write_err(id))?;
        }

        let mut tmp = config::staging_file(&self.tmp_dir).map_err(Self::write_err(id))?;
        tmp.write_all(data).map_err(Self::write_err(id))?;
        tmp.as_file().sync_all().map_err(Self::write_err(id))?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => debug!(%id, size = data.len(), "stored object"),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(%id, "object written concurrently by another writer");
            }
            Err(e) => return Err(Self::write_err(id)(e.error)),
        }
        Ok(id)
    }

    fn read(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        if !id.matches(self.config.algorithm) {
            return Err(StoreError::ObjectNotFound(id.to_hex()));
        }
        let path = self.object_path(id);
        match fs::read(&path) {
            Ok(data) => {
                debug!(%id, size = data.len(), "read object");
                Ok(data)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::ObjectNotFound(id.to_hex()))
            }
            Err(e) => Err(StoreError::read(path, e)),
        }
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        if !id.matches(self.config.algorithm) {
            return Ok(false);
        }
        let path = self.object_path(id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::read(path, e)),
        }
    }
}

/// Decide the configuration of the store at `root`, writing the marker if
/// this is the first open.
fn settle_config(root: &Path, requested: Option<StoreConfig>) -> StoreResult<StoreConfig> {
    if let Some(existing) = config::load(root)? {
        return reconcile(root, existing, requested);
    }

    let candidate = requested.unwrap_or_default();
    match config::persist(root, &candidate) {
        Ok(()) => {
            info!(root = %root.display(), "created store marker");
            Ok(candidate)
        }
        // Another process initialized the same root between our load and
        // persist; adopt (or check against) what it recorded.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let existing = config::load(root)?
                .ok_or_else(|| StoreError::init(config::marker_path(root), "marker vanished"))?;
            reconcile(root, existing, requested)
        }
        Err(e) => Err(StoreError::init(root, e)),
    }
}

fn reconcile(
    root: &Path,
    existing: StoreConfig,
    requested: Option<StoreConfig>,
) -> StoreResult<StoreConfig> {
    match requested {
        Some(requested) if requested != existing => Err(StoreError::init(
            root,
            format!(
                "store uses {}/{} but {}/{} was requested",
                existing.algorithm, existing.layout, requested.algorithm, requested.layout
            ),
        )),
        _ => Ok(existing),
    }
}
