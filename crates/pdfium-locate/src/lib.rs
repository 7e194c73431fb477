//! # pdfium-locate
//!
//! Find the [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! that was deployed alongside a desktop tool and bind `pdfium-render` to it.
//!
//! Order tools are shipped as a folder: the executable, `mapping_table.xlsx`
//! and `libpdfium.so` / `pdfium.dll` side by side. Users double-click the
//! executable from anywhere, so the current directory is not a reliable
//! anchor. This crate resolves the library in a fixed order and memoises the
//! answer for the process lifetime.
//!
//! ## Search order
//!
//! 1. `PDFIUM_LIB_PATH` — an explicit library file, or a directory holding it.
//! 2. The directory of the running executable.
//! 3. The per-user cache: `{cache_dir}/factory-order/pdfium/`
//!    (override with `PDFIUM_LOCATE_CACHE_DIR`).
//! 4. The current working directory.
//! 5. Whatever the platform loader finds (`Pdfium::bind_to_system_library`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::bind_pdfium;
//!
//! let pdfium = bind_pdfium().expect("PDFium unavailable");
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pdfium-locate operations.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// `libloading` / `pdfium-render` could not load the library at `path`.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// No candidate existed on disk and the system loader failed too.
    #[error(
        "PDFium library not found.\nSearched: {searched}\n\
Place {lib_name} next to the executable or set PDFIUM_LIB_PATH."
    )]
    NotFound {
        searched: String,
        lib_name: String,
        reason: String,
    },
}

// ── Candidate resolution ─────────────────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Platform file name of the pdfium library (`libpdfium.so`, `pdfium.dll`, …).
pub fn platform_library_name() -> String {
    Pdfium::pdfium_platform_library_name_at_path("")
        .to_string_lossy()
        .into_owned()
}

/// Per-user cache directory checked after the executable's directory.
///
/// Override by setting `PDFIUM_LOCATE_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDFIUM_LOCATE_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("factory-order").join("pdfium")
}

/// Every location probed, in priority order. Paths need not exist.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let p = PathBuf::from(env_path);
        if p.is_dir() {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(&p));
        } else {
            candidates.push(p);
        }
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }

    candidates.push(Pdfium::pdfium_platform_library_name_at_path(
        &pdfium_cache_dir(),
    ));
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    candidates
}

/// Returns the first candidate that exists on disk, memoised per process.
pub fn locate_pdfium_library() -> Option<PathBuf> {
    if let Some(path) = RESOLVED_PATH.get() {
        return Some(path.clone());
    }

    let found = first_existing(&candidate_paths())?;
    let _ = RESOLVED_PATH.set(found.clone());
    Some(found)
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

// ── Binding ──────────────────────────────────────────────────────────────────

/// Binds to the located library, falling back to the system loader.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumLocateError> {
    if let Some(path) = locate_pdfium_library() {
        return bind_pdfium_from_path(&path);
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::NotFound {
            searched: candidate_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            lib_name: platform_library_name(),
            reason: e.to_string(),
        })
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
