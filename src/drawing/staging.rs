//! The print staging folder.
//!
//! Matched drawings are copied here for printing. The folder is emptied of
//! files at the start of every check so that nothing from an earlier run is
//! printed by mistake; subdirectories are left alone.

use crate::error::{FactoryOrderError, SideEffect};
use crate::pipeline::input::has_pdf_extension;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create `staging_dir`, or delete every file directly inside it.
///
/// Failing to create or list the folder is fatal; a file that cannot be
/// deleted is recorded as a failed [`SideEffect`] and the run continues.
pub fn prepare_staging(staging_dir: &Path) -> Result<Vec<SideEffect>, FactoryOrderError> {
    let fail = |source: std::io::Error| FactoryOrderError::StagingDirFailed {
        path: staging_dir.to_path_buf(),
        source,
    };

    if !staging_dir.is_dir() {
        std::fs::create_dir_all(staging_dir).map_err(fail)?;
        info!("Created staging folder {}", staging_dir.display());
        return Ok(Vec::new());
    }

    let mut outcomes = Vec::new();
    for entry in std::fs::read_dir(staging_dir).map_err(fail)? {
        let path = entry.map_err(fail)?.path();
        if path.is_file() {
            outcomes.push(SideEffect::attempt(path, |p| std::fs::remove_file(p)));
        }
    }

    let removed = outcomes.iter().filter(|o| o.is_done()).count();
    debug!(
        "Cleared {} stale file(s) from {}",
        removed,
        staging_dir.display()
    );
    Ok(outcomes)
}

/// Copy `drawing` into `staging_dir` under its own file name.
pub fn stage_copy(drawing: &Path, staging_dir: &Path) -> SideEffect {
    let Some(name) = drawing.file_name() else {
        return SideEffect::NotAttempted;
    };
    let dest = staging_dir.join(name);
    SideEffect::attempt(dest, |d| std::fs::copy(drawing, d).map(|_| ()))
}

/// PDFs currently in the staging folder, sorted by name. This is the list a
/// print dispatcher would send to the printer.
pub fn staged_drawings(staging_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(staging_dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_pdf_extension(p))
        .collect();
    files.sort();
    files
}
