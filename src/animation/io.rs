//! Reading and writing BVH files on disk.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use super::document::BvhDocument;
use super::format::{FormatError, NumberFormat};

/// File extension appended by [`write_bvh`].
pub const BVH_EXTENSION: &str = ".bvh";

/// Errors from BVH file I/O.
#[derive(Debug, thiserror::Error)]
pub enum BvhError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed BVH file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Read and decode a BVH file.
pub fn read_bvh<P: AsRef<Path>>(path: P) -> Result<BvhDocument, BvhError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| BvhError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let document = BvhDocument::read_from(&mut reader).map_err(|e| match e {
        BvhError::Format(source) => BvhError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    info!(
        "Read {} ({} frames, {} channels, frame time {}s)",
        path.display(),
        document.frames(),
        document.channels(),
        document.frame_time_seconds()
    );
    Ok(document)
}

/// Encode a document and write it to `name` with `.bvh` appended.
///
/// The extension is appended, never substituted, so `out/IMF1` becomes
/// `out/IMF1.bvh` and `walk.v2` becomes `walk.v2.bvh`. Parent directories
/// must already exist. Returns the written path.
pub fn write_bvh<P: AsRef<Path>>(
    document: &BvhDocument,
    name: P,
    format: NumberFormat,
) -> Result<PathBuf, BvhError> {
    let mut path = OsString::from(name.as_ref().as_os_str());
    path.push(BVH_EXTENSION);
    let path = PathBuf::from(path);

    let file = File::create(&path).map_err(|source| BvhError::Create {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    document.write_to_with(&mut writer, format)?;
    writer.flush()?;

    info!("Wrote {} ({} frames)", path.display(), document.frames());
    Ok(path)
}
