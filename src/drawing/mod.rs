//! Drawing revision matching.
//!
//! Customer parts with drawings (codes starting with the configured prefix,
//! `YY` by default) are printed from a local drawing library. When the
//! customer revises a drawing, the order says so, either in the reply
//! column or as the last word of the description, while the library may
//! still hold the old file. This module finds each part's drawing, reads the
//! revision label out of it and compares the two as plain strings
//! (`B/01` and `B01` are different revisions).
//!
//! ```text
//! reconciled rows ──▶ expected revision ──▶ find drawing ──▶ read label ──▶ compare
//!                                                                              │
//!                                                          match: copy to staging
//! ```
//!
//! Printing is gated on the whole run: see [`CheckStats::print_enabled`].

pub mod check;
pub mod locate;
pub mod revision;
pub mod staging;

pub use check::{
    check_drawings, check_drawings_with, CheckStats, CheckStatus, DrawingCheck, DrawingReport,
    DrawingTextReader, PdfiumTextReader,
};
pub use locate::find_drawing_file;
pub use revision::RevisionSource;
pub use staging::{prepare_staging, stage_copy, staged_drawings};
