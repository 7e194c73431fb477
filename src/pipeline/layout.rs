//! Document capture: page-1 text through pdfium, ruled tables through
//! pdfplumber.
//!
//! pdfium opens the order first. It decides whether the file is a readable
//! PDF, checks the password, and supplies the plain text of page 1 that the
//! header fields come from. pdfplumber then walks every page and runs its
//! lattice table finder, which keeps stacked cell lines (price, quantity,
//! unit) inside their own cell instead of interleaving neighbouring columns.
//!
//! One [`Pdfium`] binding serves the whole process. Callers bind it once
//! with [`bind_pdfium`] and pass it by reference.

use super::table::{self, Table};
use crate::error::FactoryOrderError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// The captured content of a whole order document.
#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    /// Plain text of page 1, for header fields.
    pub first_page_text: String,
    /// Tables of each page, in page order; `None` when the page could not
    /// be read.
    pub pages: Vec<Option<Vec<Table>>>,
}

/// Bind the pdfium library once for the process.
pub fn bind_pdfium() -> Result<Pdfium, FactoryOrderError> {
    Ok(pdfium_locate::bind_pdfium()?)
}

/// Open `pdf_path` and capture the header text and every page's tables.
///
/// Failing to open the document is fatal. A single unreadable page is
/// logged and recorded as `None`.
pub fn load_document(
    pdfium: &Pdfium,
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentLayout, FactoryOrderError> {
    let pdf_path = super::input::resolve_local(pdf_path)?;
    let first_page_text = first_page_text(pdfium, &pdf_path, password)?;

    let pdf = pdfplumber::Pdf::open_file(&pdf_path, None).map_err(|e| {
        FactoryOrderError::CorruptPdf {
            path: pdf_path.clone(),
            detail: e.to_string(),
        }
    })?;

    let settings = table::lattice_settings();
    let mut layout = DocumentLayout {
        first_page_text,
        pages: Vec::new(),
    };
    for (idx, page_result) in pdf.pages_iter().enumerate() {
        match page_result {
            Ok(page) => {
                let tables: Vec<Table> = page
                    .find_tables(&settings)
                    .iter()
                    .map(table::from_lattice)
                    .filter(|t| !t.is_empty())
                    .collect();
                debug!("Page {}: {} tables", page.page_number(), tables.len());
                layout.pages.push(Some(tables));
            }
            Err(e) => {
                warn!("Skipping unreadable page {}: {:?}", idx + 1, e);
                layout.pages.push(None);
            }
        }
    }

    info!("PDF loaded: {} pages", layout.pages.len());
    Ok(layout)
}

/// Plain text of page 1, empty when the page has no text layer.
fn first_page_text(
    pdfium: &Pdfium,
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<String, FactoryOrderError> {
    let document = open_document(pdfium, pdf_path, password)?;
    let pages = document.pages();
    let Ok(page) = pages.first() else {
        return Ok(String::new());
    };
    let text = match page.text() {
        Ok(text) => text.all(),
        Err(e) => {
            warn!("Page 1 text unavailable for header fields: {:?}", e);
            String::new()
        }
    };
    Ok(text)
}

/// Plain text of every page, in page order.
///
/// Used for drawing files, where only the revision label matters.
pub fn page_texts(
    pdfium: &Pdfium,
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<String>, FactoryOrderError> {
    let document = open_document(pdfium, pdf_path, password)?;
    let mut texts = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        match page.text() {
            Ok(text) => texts.push(text.all()),
            Err(e) => {
                warn!("No text on page {} of '{}': {:?}", idx + 1, pdf_path.display(), e);
                texts.push(String::new());
            }
        }
    }
    Ok(texts)
}

/// Load a document, mapping pdfium failures onto [`FactoryOrderError`].
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, FactoryOrderError> {
    let pdf_path = super::input::resolve_local(pdf_path)?;

    pdfium.load_pdf_from_file(&pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                FactoryOrderError::WrongPassword { path: pdf_path.clone() }
            } else {
                FactoryOrderError::PasswordRequired { path: pdf_path.clone() }
            }
        } else {
            FactoryOrderError::CorruptPdf {
                path: pdf_path.clone(),
                detail: err_str,
            }
        }
    })
}
