//! Page geometry and document summary tools.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{load_page, open_pdf, page_bounds};
use crate::error::{PdfToolsError, Result};
use crate::geometry::Bounds;
use crate::markdown::page_to_plain_text;

/// Largest width or height difference, in points, still treated as the same page size.
const PAGE_SIZE_TOLERANCE: f32 = 0.5;

// ============== Get Page Rect ==============

/// Parameters for getting a page rectangle.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetPageRectParams {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Page number (0-indexed). When omitted, every page must share the same size.
    #[serde(default)]
    pub page: Option<i32>,
}

/// Page rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PageRect {
    /// X origin (usually 0).
    pub x: f32,
    /// Y origin (usually 0).
    pub y: f32,
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Coordinate unit, always "point" (1/72 inch).
    pub unit: String,
}

impl From<Bounds> for PageRect {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: bounds.left,
            y: bounds.top,
            width: bounds.width(),
            height: bounds.height(),
            unit: "point".to_string(),
        }
    }
}

/// Get the rectangle of one page, or the rectangle shared by all pages.
///
/// Without a page index the document must be uniform: a page whose size
/// differs from page 0 fails with [`PdfToolsError::InconsistentPageSize`].
pub fn get_page_rect(params: GetPageRectParams) -> Result<PageRect> {
    tracing::info!(path = %params.path.display(), page = ?params.page, "getting page rect");
    let doc = open_pdf(&params.path)?;

    if let Some(page) = params.page {
        let bounds = page_bounds(&load_page(&doc, &params.path, page)?)?;
        return Ok(bounds.into());
    }

    let first = page_bounds(&doc.load_page(0)?)?;
    for index in 1..doc.page_count()? {
        let bounds = page_bounds(&doc.load_page(index)?)?;
        if (bounds.width() - first.width()).abs() > PAGE_SIZE_TOLERANCE
            || (bounds.height() - first.height()).abs() > PAGE_SIZE_TOLERANCE
        {
            return Err(PdfToolsError::InconsistentPageSize {
                page: index,
                expected: (first.width(), first.height()),
                found: (bounds.width(), bounds.height()),
            });
        }
    }

    Ok(first.into())
}

// ============== Get PDF Summary ==============

/// Parameters for summarising a PDF.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetPdfSummaryParams {
    /// Path to the PDF file.
    pub path: PathBuf,
}

/// A flattened table of contents entry.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TocEntry {
    /// Nesting level (1 = top level).
    pub level: u32,
    /// Bookmark title.
    pub title: String,
    /// Target page number (0-indexed).
    pub page: Option<i32>,
}

/// Summary of a PDF document.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PdfSummary {
    /// Total number of pages.
    pub page_count: i32,
    /// UTF-8 byte length of the plain text of all pages.
    pub total_characters: usize,
    /// Outline entries in document order.
    pub table_of_contents: Vec<TocEntry>,
    /// Width of the first page in points.
    pub width: f32,
    /// Height of the first page in points.
    pub height: f32,
}

fn collect_toc(outline: &mupdf::Outline, level: u32, entries: &mut Vec<TocEntry>) {
    entries.push(TocEntry {
        level,
        title: outline.title.clone(),
        page: outline.dest.as_ref().map(|dest| dest.loc.page_number as i32),
    });
    for child in &outline.down {
        collect_toc(child, level + 1, entries);
    }
}

/// Summarise a PDF: page count, text volume, outline and first page size.
pub fn get_pdf_summary(params: GetPdfSummaryParams) -> Result<PdfSummary> {
    tracing::info!(path = %params.path.display(), "summarising PDF");
    let doc = open_pdf(&params.path)?;
    let page_count = doc.page_count()?;

    let mut total_characters = 0;
    for index in 0..page_count {
        total_characters += page_to_plain_text(&doc.load_page(index)?)?.len();
    }

    let mut table_of_contents = Vec::new();
    for outline in &doc.outlines()? {
        collect_toc(outline, 1, &mut table_of_contents);
    }

    let first = page_bounds(&doc.load_page(0)?)?;

    Ok(PdfSummary {
        page_count,
        total_characters,
        table_of_contents,
        width: first.width(),
        height: first.height(),
    })
}
