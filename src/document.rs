//! JSON documents on disk, shared by the settings and history stores.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Reads and parses `path`. Returns `Ok(None)` when the file does not exist.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::io(path, err)),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| Error::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes `value` to `path`, creating every missing ancestor directory.
///
/// The document is written to a temporary sibling and renamed into place so
/// readers never observe a partial file.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
    }

    let data = serde_json::to_string_pretty(value)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);
    fs::write(temp_path, data).map_err(|err| Error::io(temp_path, err))?;
    if let Err(err) = fs::rename(temp_path, path) {
        let _ = fs::remove_file(temp_path);
        return Err(Error::io(path, err));
    }
    Ok(())
}

/// Renames a document that failed to parse to `<path>.bak` so a fresh one can
/// take its place. A failed rename is logged and otherwise ignored.
pub fn move_aside(path: &Path) -> PathBuf {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    if let Err(err) = fs::rename(path, &backup) {
        warn!(path = %path.display(), "could not keep a copy of the corrupt document: {}", err);
    }
    backup
}
