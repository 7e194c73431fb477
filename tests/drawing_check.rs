//! Drawing revision check over a real drawing directory, with drawing text
//! supplied by a fake reader instead of pdfium.

use factory_order::drawing::{
    check_drawings, check_drawings_with, staged_drawings, CheckStatus, DrawingTextReader,
    RevisionSource,
};
use factory_order::{FactoryOrderError, ReconciledRow, SideEffect, ToolConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ── Fakes and fixtures ───────────────────────────────────────────────────────

/// Page texts keyed by file name; unknown files fail to read.
#[derive(Default)]
struct FakeReader {
    pages: HashMap<String, Vec<String>>,
}

impl FakeReader {
    fn with(mut self, file: &str, pages: &[&str]) -> Self {
        self.pages
            .insert(file.to_string(), pages.iter().map(|p| p.to_string()).collect());
        self
    }
}

impl DrawingTextReader for FakeReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, FactoryOrderError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.pages
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryOrderError::CorruptPdf {
                path: path.to_path_buf(),
                detail: "unreadable".into(),
            })
    }
}

/// Route library logs to the test harness; `RUST_LOG` picks the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn row(code: &str, description: &str, reply: &str) -> ReconciledRow {
    ReconciledRow {
        customer_code: code.into(),
        description: description.into(),
        reply: reply.into(),
        ..ReconciledRow::default()
    }
}

struct Library {
    _dir: tempfile::TempDir,
    drawings: PathBuf,
    staging: PathBuf,
}

fn library(files: &[&str]) -> Library {
    let dir = tempfile::tempdir().unwrap();
    let drawings = dir.path().join("图纸库");
    std::fs::create_dir(&drawings).unwrap();
    for f in files {
        std::fs::write(drawings.join(f), b"%PDF-1.4 drawing").unwrap();
    }
    let staging = drawings.join("待打印");
    Library {
        _dir: dir,
        drawings,
        staging,
    }
}

const DRAWING: &str = "YY60030058导线-A02版.pdf";

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn description_revision_mismatch_blocks_printing() {
    init_tracing();
    let lib = library(&[DRAWING]);
    let reader = FakeReader::default().with(DRAWING, &["图号 DX-160711-01 版本号: A02"]);
    let rows = [row(
        "YY60030058",
        "双剥镀 UL1007#24 黑色2+5 L=360mm B/01",
        "",
    )];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();

    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];
    assert_eq!(r.status, CheckStatus::Mismatch);
    assert_eq!(r.expected_revision.as_deref(), Some("B/01"));
    assert_eq!(r.revision_source, Some(RevisionSource::Description));
    assert_eq!(r.local_revision.as_deref(), Some("A02"));
    assert_eq!(r.staged, SideEffect::NotAttempted);
    assert!(!report.print_enabled());
    assert!(staged_drawings(&lib.staging).is_empty());
}

#[test]
fn description_revision_match_replaces_stale_staging() {
    init_tracing();
    let lib = library(&[DRAWING]);
    std::fs::create_dir(&lib.staging).unwrap();
    std::fs::write(lib.staging.join("YY1-stale.pdf"), b"%PDF old").unwrap();
    let reader = FakeReader::default().with(DRAWING, &["图号 DX-160711-01 版本 B/01"]);
    let rows = [row(
        "YY60030058",
        "双剥镀 UL1007#24 黑色2+5 L=360mm B/01",
        "",
    )];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();

    let r = &report.results[0];
    assert_eq!(r.status, CheckStatus::Match);
    assert_eq!(r.expected_revision.as_deref(), Some("B/01"));
    assert_eq!(r.revision_source, Some(RevisionSource::Description));
    assert_eq!(r.local_revision.as_deref(), Some("B/01"));
    assert!(r.staged.is_done());
    assert_eq!(report.cleanup.len(), 1);
    assert!(report.print_enabled());
    assert!(!lib.staging.join("YY1-stale.pdf").exists());
    assert_eq!(staged_drawings(&lib.staging), vec![lib.staging.join(DRAWING)]);
}

#[test]
fn missing_drawing_dir_is_an_error_and_not_created() {
    init_tracing();
    let lib = library(&[DRAWING]);
    let typo = lib.drawings.with_file_name("图纸酷");
    let staging = typo.join("待打印");
    let rows = [row("YY60030058", "", "A02")];

    let err = check_drawings(&rows, &typo, &staging, &FakeReader::default(), "YY").unwrap_err();

    match err {
        FactoryOrderError::FileNotFound { path } => assert_eq!(path, typo),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert!(!typo.exists());
    assert!(!staging.exists());
}

#[test]
fn reply_revision_match_stages_drawing() {
    let lib = library(&[DRAWING]);
    let reader = FakeReader::default().with(DRAWING, &["版本号: A02"]);
    let rows = [row("YY60030058", "导线 B/01", "A02")];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();

    let r = &report.results[0];
    assert_eq!(r.status, CheckStatus::Match);
    assert_eq!(r.revision_source, Some(RevisionSource::Reply));
    assert!(r.staged.is_done());
    assert!(report.print_enabled());
    assert_eq!(staged_drawings(&lib.staging), vec![lib.staging.join(DRAWING)]);
}

#[test]
fn revision_compare_is_exact() {
    let lib = library(&[DRAWING]);
    let reader = FakeReader::default().with(DRAWING, &["版本: REV B01"]);
    let rows = [row("YY60030058", "", "B/01")];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();
    assert_eq!(report.results[0].status, CheckStatus::Mismatch);
}

#[test]
fn every_status_is_reachable() {
    let lib = library(&["YY3.pdf", "YY4.pdf", "YY5.pdf"]);
    let reader = FakeReader::default()
        .with("YY3.pdf", &["no label"])
        .with("YY5.pdf", &["cover", "版本号: C1"]);
    let rows = [
        row("F100", "", ""),
        row("YY1", "导线-A02版", ""),
        row("YY2", "", "A01"),
        row("YY3", "", "A01"),
        row("YY4", "", "A01"),
        row("YY5", "", "C1"),
    ];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();
    let statuses: Vec<CheckStatus> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            CheckStatus::Skipped,
            CheckStatus::NoVersion,
            CheckStatus::NoDrawing,
            CheckStatus::NoPdfVersion,
            // unreadable file counts as no extraction
            CheckStatus::NoPdfVersion,
            CheckStatus::Match,
        ]
    );
    assert_eq!(report.stats.total, 6);
    assert_eq!(report.stats.no_pdf_version, 2);
    assert!(report.print_enabled());
}

#[test]
fn duplicates_checked_once_but_skips_repeat() {
    let lib = library(&[DRAWING]);
    let reader = FakeReader::default().with(DRAWING, &["版本号: A02"]);
    let rows = [
        row("F1", "", ""),
        row("YY60030058", "", "A02"),
        row("F1", "", ""),
        row(" YY60030058 ", "", "ZZZ"),
    ];

    let report = check_drawings(&rows, &lib.drawings, &lib.staging, &reader, "YY").unwrap();
    let codes: Vec<(&str, CheckStatus)> = report
        .results
        .iter()
        .map(|r| (r.code.as_str(), r.status))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("F1", CheckStatus::Skipped),
            ("YY60030058", CheckStatus::Match),
            ("F1", CheckStatus::Skipped),
        ]
    );
}

#[test]
fn staging_never_accumulates_between_runs() {
    let lib = library(&[DRAWING, "YY7.pdf"]);
    let reader = FakeReader::default()
        .with(DRAWING, &["版本号: A02"])
        .with("YY7.pdf", &["版本号: B1"]);

    let first = [row("YY60030058", "", "A02")];
    check_drawings(&first, &lib.drawings, &lib.staging, &reader, "YY").unwrap();
    std::fs::write(lib.staging.join("leftover.txt"), b"x").unwrap();

    let second = [row("YY7", "", "B1")];
    let report = check_drawings(&second, &lib.drawings, &lib.staging, &reader, "YY").unwrap();

    assert_eq!(report.cleanup.len(), 2);
    assert!(report.cleanup.iter().all(SideEffect::is_done));
    assert_eq!(staged_drawings(&lib.staging), vec![lib.staging.join("YY7.pdf")]);
    assert!(!lib.staging.join("leftover.txt").exists());
}

#[test]
fn staging_is_cleared_even_when_nothing_matches() {
    let lib = library(&[]);
    std::fs::create_dir(&lib.staging).unwrap();
    std::fs::write(lib.staging.join("old.pdf"), b"%PDF").unwrap();

    let report = check_drawings(&[], &lib.drawings, &lib.staging, &FakeReader::default(), "YY")
        .unwrap();
    assert!(report.results.is_empty());
    assert!(!report.print_enabled());
    assert!(staged_drawings(&lib.staging).is_empty());
}

#[test]
fn config_supplies_prefix_and_staging_folder() {
    let lib = library(&["XX1.pdf"]);
    let reader = FakeReader::default().with("XX1.pdf", &["版本号: A1"]);
    let config = ToolConfig::builder()
        .drawing_prefix("XX")
        .staging_folder("print")
        .build()
        .unwrap();

    let rows = [row("XX1", "", "A1"), row("YY1", "", "A1")];
    let report = check_drawings_with(&rows, &lib.drawings, &reader, &config).unwrap();

    assert_eq!(report.results[0].status, CheckStatus::Match);
    assert_eq!(report.results[1].status, CheckStatus::Skipped);
    assert_eq!(report.staging_dir, lib.drawings.join("print"));
    assert_eq!(
        staged_drawings(&lib.drawings.join("print")),
        vec![lib.drawings.join("print").join("XX1.pdf")]
    );
}
