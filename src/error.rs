//! Error types for the factory-order library.
//!
//! Three kinds of outcome are kept apart:
//!
//! * [`FactoryOrderError`] — **Fatal** for the current operation: the order
//!   PDF cannot be opened, the catalog workbook is corrupt, the export file
//!   cannot be written. Returned as `Err(FactoryOrderError)` and never
//!   retried by the library.
//!
//! * Soft-degrade conditions (no catalog file, no revision token, no drawing)
//!   are not errors at all. They travel as data: [`crate::catalog::CatalogLoad`],
//!   empty fields, or a [`crate::drawing::CheckStatus`].
//!
//! * [`SideEffect`] — the outcome of a best-effort filesystem action (staging
//!   copy, stale-file removal). A failure is recorded and logged, then the run
//!   carries on.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the factory-order library.
#[derive(Debug, Error)]
pub enum FactoryOrderError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Spreadsheet errors ────────────────────────────────────────────────
    /// The catalog workbook exists but could not be read.
    #[error("Catalog workbook '{path}' could not be read: {detail}")]
    CatalogUnreadable { path: PathBuf, detail: String },

    /// rust_xlsxwriter rejected a cell, a sheet setting, or the save.
    #[error("Failed to build export workbook '{path}': {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create, write or persist the output spreadsheet.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staging directory could not be created.
    #[error("Failed to prepare staging directory '{path}': {source}")]
    StagingDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
The order tool expects the pdfium shared library next to the executable.\n\
  • Copy libpdfium.so / libpdfium.dylib / pdfium.dll beside factory-order.\n\
  • Or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<pdfium_locate::PdfiumLocateError> for FactoryOrderError {
    fn from(e: pdfium_locate::PdfiumLocateError) -> Self {
        FactoryOrderError::PdfiumBindingFailed(e.to_string())
    }
}

/// Outcome of one best-effort filesystem action.
///
/// `Failed` means the action was attempted and its failure deliberately
/// ignored; `NotAttempted` means nothing was tried (e.g. a mismatch never
/// triggers a copy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SideEffect {
    Done { path: PathBuf },
    Failed { path: PathBuf, reason: String },
    NotAttempted,
}

impl SideEffect {
    /// Run `action` against `path`, turning an I/O error into `Failed`.
    pub fn attempt<F>(path: PathBuf, action: F) -> Self
    where
        F: FnOnce(&std::path::Path) -> std::io::Result<()>,
    {
        match action(&path) {
            Ok(()) => SideEffect::Done { path },
            Err(e) => {
                tracing::warn!("Best-effort action on '{}' failed: {}", path.display(), e);
                SideEffect::Failed {
                    path,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SideEffect::Done { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SideEffect::Failed { .. })
    }
}
