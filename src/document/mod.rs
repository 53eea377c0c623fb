//! In-memory SVG document handling.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An SVG document held in memory for the duration of one export run.
///
/// The document is never modified; the same bytes feed both the layer
/// scan and the snapshot file the renderer reads.
#[derive(Debug)]
pub struct SvgDocument {
    path: PathBuf,
    data: Vec<u8>,
}

impl SvgDocument {
    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Create a document from raw bytes.
    ///
    /// The path is only used to derive the artifact base name.
    pub fn new(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Source path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw document bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Base name of the source file without extension.
    ///
    /// Embedded in every artifact name: `{base_name}_{group_id}.svg`.
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Write the current document state to the snapshot path the external
    /// renderer reads. Overwrites any previous snapshot.
    pub fn snapshot_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.data)
    }
}
