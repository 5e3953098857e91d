use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::progress::LoadProgress;
use super::slot::CancelToken;

const READ_CHUNK: usize = 1 << 20;

/// Where the container bytes for a request come from
#[derive(Debug, Clone)]
pub enum AssetSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl AssetSource {
    pub fn bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        AssetSource::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name, the file name for paths
    pub fn name(&self) -> String {
        match self {
            AssetSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            AssetSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Directory for resolving external URIs
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            AssetSource::Path(path) => path.parent(),
            AssetSource::Bytes { .. } => None,
        }
    }
}

/// Read a file in chunks, updating `progress` as it goes.
/// Returns `Ok(None)` when the token was cancelled mid-read.
pub fn read_chunked(
    path: &Path,
    token: &CancelToken,
    progress: &LoadProgress,
) -> io::Result<Option<Vec<u8>>> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();
    progress.set_total(total);

    let mut data = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        if token.is_cancelled() {
            return Ok(None);
        }
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        data.extend_from_slice(&chunk[..n]);
        progress.advance(n as u64);
    }

    // Size was unknown or changed while reading
    if progress.total() != data.len() as u64 {
        progress.set_total(data.len() as u64);
    }
    Ok(Some(data))
}
