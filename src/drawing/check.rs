//! The drawing revision check over a reconciled order.

use super::locate::find_drawing_file;
use super::revision::{expected_revision, from_drawing_pages, RevisionSource};
use super::staging::{prepare_staging, stage_copy};
use crate::config::ToolConfig;
use crate::error::{FactoryOrderError, SideEffect};
use crate::reconcile::ReconciledRow;
use pdfium_render::prelude::Pdfium;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source of drawing text, one string per page.
///
/// The production reader goes through pdfium; tests substitute canned text.
pub trait DrawingTextReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, FactoryOrderError>;
}

/// [`DrawingTextReader`] borrowing the process-wide pdfium binding.
pub struct PdfiumTextReader<'a> {
    pdfium: &'a Pdfium,
}

impl<'a> PdfiumTextReader<'a> {
    pub fn new(pdfium: &'a Pdfium) -> Self {
        Self { pdfium }
    }
}

impl DrawingTextReader for PdfiumTextReader<'_> {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, FactoryOrderError> {
        crate::pipeline::layout::page_texts(self.pdfium, path, None)
    }
}

/// Outcome category of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Match,
    Mismatch,
    NoVersion,
    NoDrawing,
    NoPdfVersion,
    Skipped,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Match => "match",
            CheckStatus::Mismatch => "mismatch",
            CheckStatus::NoVersion => "no_version",
            CheckStatus::NoDrawing => "no_drawing",
            CheckStatus::NoPdfVersion => "no_pdf_version",
            CheckStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result for one customer code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingCheck {
    pub code: String,
    pub expected_revision: Option<String>,
    pub revision_source: Option<RevisionSource>,
    pub local_revision: Option<String>,
    pub drawing_path: Option<PathBuf>,
    pub status: CheckStatus,
    pub message: String,
    /// Copy into the staging folder; attempted only on a match.
    pub staged: SideEffect,
}

impl DrawingCheck {
    fn new(code: &str, status: CheckStatus) -> Self {
        Self {
            code: code.to_string(),
            expected_revision: None,
            revision_source: None,
            local_revision: None,
            drawing_path: None,
            status,
            message: String::new(),
            staged: SideEffect::NotAttempted,
        }
    }
}

/// Per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub no_version: usize,
    pub no_drawing: usize,
    pub no_pdf_version: usize,
    pub skipped: usize,
}

impl CheckStats {
    pub fn from_results(results: &[DrawingCheck]) -> Self {
        let mut s = CheckStats {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.status {
                CheckStatus::Match => s.matched += 1,
                CheckStatus::Mismatch => s.mismatched += 1,
                CheckStatus::NoVersion => s.no_version += 1,
                CheckStatus::NoDrawing => s.no_drawing += 1,
                CheckStatus::NoPdfVersion => s.no_pdf_version += 1,
                CheckStatus::Skipped => s.skipped += 1,
            }
        }
        s
    }

    /// Printing is allowed only with no mismatch and at least one match.
    pub fn print_enabled(&self) -> bool {
        self.mismatched == 0 && self.matched > 0
    }
}

/// Everything one check run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DrawingReport {
    pub results: Vec<DrawingCheck>,
    pub stats: CheckStats,
    pub staging_dir: PathBuf,
    /// Removal of stale staging files before the run.
    pub cleanup: Vec<SideEffect>,
}

impl DrawingReport {
    pub fn print_enabled(&self) -> bool {
        self.stats.print_enabled()
    }
}

/// Run the check with the prefix and staging folder from `config`.
pub fn check_drawings_with(
    rows: &[ReconciledRow],
    drawing_dir: &Path,
    reader: &dyn DrawingTextReader,
    config: &ToolConfig,
) -> Result<DrawingReport, FactoryOrderError> {
    check_drawings(
        rows,
        drawing_dir,
        &config.staging_dir(drawing_dir),
        reader,
        &config.drawing_prefix,
    )
}

/// Compare each drawing-bearing code's expected revision with its local
/// drawing, staging the drawings that match.
///
/// Codes without `prefix` are reported as skipped on every occurrence.
/// Any other code is checked once; repeats are dropped silently.
///
/// A missing `drawing_dir` fails with [`FactoryOrderError::FileNotFound`]
/// before the staging folder is touched.
pub fn check_drawings(
    rows: &[ReconciledRow],
    drawing_dir: &Path,
    staging_dir: &Path,
    reader: &dyn DrawingTextReader,
    prefix: &str,
) -> Result<DrawingReport, FactoryOrderError> {
    if !drawing_dir.is_dir() {
        return Err(FactoryOrderError::FileNotFound {
            path: drawing_dir.to_path_buf(),
        });
    }
    let cleanup = prepare_staging(staging_dir)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::new();

    for row in rows {
        let code = row.customer_code.trim();

        if !code.starts_with(prefix) {
            let mut r = DrawingCheck::new(code, CheckStatus::Skipped);
            r.message = format!("not a {prefix} part, skipped");
            results.push(r);
            continue;
        }
        if !seen.insert(code) {
            continue;
        }

        results.push(check_one(code, row, drawing_dir, staging_dir, reader));
    }

    let stats = CheckStats::from_results(&results);
    info!(
        "Drawing check: {} match, {} mismatch, {} other",
        stats.matched,
        stats.mismatched,
        stats.total - stats.matched - stats.mismatched
    );

    Ok(DrawingReport {
        results,
        stats,
        staging_dir: staging_dir.to_path_buf(),
        cleanup,
    })
}

fn check_one(
    code: &str,
    row: &ReconciledRow,
    drawing_dir: &Path,
    staging_dir: &Path,
    reader: &dyn DrawingTextReader,
) -> DrawingCheck {
    let Some((expected, source)) = expected_revision(&row.reply, &row.description) else {
        let mut r = DrawingCheck::new(code, CheckStatus::NoVersion);
        r.message = "no revision given on the order".into();
        return r;
    };

    let mut r = DrawingCheck::new(code, CheckStatus::NoDrawing);
    r.expected_revision = Some(expected.clone());
    r.revision_source = Some(source);

    let Some(drawing) = find_drawing_file(drawing_dir, code) else {
        r.message = "drawing not found".into();
        return r;
    };
    r.drawing_path = Some(drawing.clone());

    let local = match reader.page_texts(&drawing) {
        Ok(pages) => from_drawing_pages(&pages),
        Err(e) => {
            warn!("Cannot read drawing '{}': {}", drawing.display(), e);
            None
        }
    };
    let Some(local) = local else {
        r.status = CheckStatus::NoPdfVersion;
        r.message = "no revision label in drawing".into();
        return r;
    };
    r.local_revision = Some(local.clone());

    if local == expected {
        r.status = CheckStatus::Match;
        r.message = format!("revision matches: {local}");
        r.staged = stage_copy(&drawing, staging_dir);
        debug!("{} staged: {:?}", code, r.staged);
    } else {
        r.status = CheckStatus::Mismatch;
        r.message = format!("local: {local} → order: {expected}");
    }
    r
}
