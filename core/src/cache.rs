//! On-disk snapshot of a built prefix dictionary.
//!
//! Building the prefix table from a large text dictionary is the expensive
//! part of initialization, so the result can be dumped to a cache file and
//! reloaded on later runs. The cache is an optimization only: any failure to
//! read it falls back to a rebuild, and a failure to write it is logged and
//! ignored. The format is a magic tag followed by a versioned bincode
//! payload.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::dict::PrefixDict;

const MAGIC: &[u8; 8] = b"HANSEG\x00\x01";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    dict: PrefixDict,
}

/// Load a cached dictionary, or `None` when the cache is missing, stale
/// (not newer than `source_mtime`), or unreadable for any reason.
pub fn load(path: &Path, source_mtime: SystemTime) -> Option<PrefixDict> {
    let mtime = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    if mtime <= source_mtime {
        return None;
    }
    let bytes = fs::read(path).ok()?;
    let payload = bytes.strip_prefix(MAGIC)?;
    let snapshot: Snapshot = bincode::deserialize(payload).ok()?;
    if snapshot.version != FORMAT_VERSION {
        return None;
    }
    tracing::debug!(cache = %path.display(), "loaded dictionary from cache");
    Some(snapshot.dict)
}

/// Write the cache through a temp file in the destination directory and
/// atomically rename it into place, so readers never observe a torn file.
pub fn store(path: &Path, dict: &PrefixDict) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    tmp.write_all(MAGIC)?;
    let snapshot = Snapshot {
        version: FORMAT_VERSION,
        dict: dict.clone(),
    };
    bincode::serialize_into(tmp.as_file_mut(), &snapshot)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
