//! Directory-of-files plumbing shared by the collector and the aggregator.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::StoreError;

/// `*.json` files directly under `dir`, sorted by file name.
///
/// Sub-directories and other extensions are ignored.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::NotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))? {
        let path = entry.map_err(|e| StoreError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one JSON document.
pub fn read_json(path: &Path) -> Result<Value, StoreError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::io(path, e)
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite `path` with pretty-printed JSON, creating parent directories.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
    out.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// File name for log lines and skip reports.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
