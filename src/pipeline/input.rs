//! Input validation: make sure a user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file, a permission problem and a non-PDF all as
//! "failed to load". Checking up front turns those into distinct
//! [`FactoryOrderError`] variants, and checking the `%PDF` magic bytes keeps
//! a renamed spreadsheet from reaching pdfium at all.

use crate::error::FactoryOrderError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, FactoryOrderError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(FactoryOrderError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(FactoryOrderError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FactoryOrderError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FactoryOrderError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Case-insensitive `.pdf` extension check.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
