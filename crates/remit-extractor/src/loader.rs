//! Document loading.
//!
//! Text extraction from source documents is an external concern; this loader
//! reads documents whose text has already been extracted to plain files.

use remit_domain::traits::DocumentLoader;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a document
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Reading the file failed
    #[error("failed to load document {path}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Loader for pre-extracted plain-text documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextLoader;

impl DocumentLoader for PlainTextLoader {
    type Error = LoaderError;

    fn load_text(&self, path: &Path) -> Result<String, Self::Error> {
        fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
