//! Opening documents and resolving pages.
//!
//! Every tool call opens its own [`Document`] through [`open_pdf`] and drops it
//! before returning; handles are never cached or shared between calls.

use std::path::Path;

use mupdf::{Document, Page};

use crate::error::{PdfToolsError, Result};
use crate::geometry::Bounds;

/// Open the PDF at `path`.
///
/// The bytes are handed to MuPDF with the PDF handler forced, so a file that
/// merely has a `.pdf` extension (or lacks one) is judged by its content.
pub fn open_pdf(path: &Path) -> Result<Document> {
    let display = path.display().to_string();
    // Missing and unreadable inputs (permissions, directories) are both NotFound.
    let bytes = std::fs::read(path).map_err(|e| {
        tracing::debug!(path = %display, error = %e, kind = ?e.kind(), "cannot read input");
        PdfToolsError::NotFound {
            path: display.clone(),
        }
    })?;

    let invalid = |e: mupdf::Error| PdfToolsError::InvalidDocument {
        path: display.clone(),
        reason: e.to_string(),
    };

    let doc = Document::from_bytes(&bytes, "application/pdf").map_err(invalid)?;

    if doc.needs_password().map_err(invalid)? {
        return Err(PdfToolsError::PasswordRequired {
            path: display.clone(),
        });
    }

    let page_count = doc.page_count().map_err(invalid)?;
    if page_count <= 0 {
        return Err(PdfToolsError::InvalidDocument {
            path: display,
            reason: "document has no pages".to_string(),
        });
    }

    tracing::debug!(path = %display, page_count, "opened document");
    Ok(doc)
}

/// `InvalidRange` for a page index outside `0..page_count` of the file at `path`.
pub(crate) fn page_out_of_range(path: &Path, page: i32, page_count: i32) -> PdfToolsError {
    PdfToolsError::invalid_range(format!(
        "page {} in {} (document has {} pages, valid range: 0-{})",
        page,
        path.display(),
        page_count,
        page_count - 1
    ))
}

/// Validate a zero-based page index against the document opened from `path`.
pub fn validate_page_number(doc: &Document, path: &Path, page: i32) -> Result<()> {
    let page_count = doc.page_count()?;
    if page < 0 || page >= page_count {
        return Err(page_out_of_range(path, page, page_count));
    }
    Ok(())
}

/// Load a page after validating its index.
pub fn load_page(doc: &Document, path: &Path, page: i32) -> Result<Page> {
    validate_page_number(doc, path, page)?;
    Ok(doc.load_page(page)?)
}

/// Bounds of a loaded page in page coordinates.
pub fn page_bounds(page: &Page) -> Result<Bounds> {
    Ok(Bounds::from(page.bounds()?))
}
