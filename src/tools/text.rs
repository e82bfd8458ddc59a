//! Text extraction tools: whole-document reading and region cropping.

use std::io::Write;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::document::{load_page, open_pdf, page_bounds, page_out_of_range};
use crate::error::{PdfToolsError, Result};
use crate::geometry::Bounds;
use crate::markdown::page_to_markdown;

/// Separator placed between consecutive pages in `read_pdf` output.
pub const PAGE_SEPARATOR: &str = "\n-----\n\n";

/// Write `contents` to `path`, replacing any existing file.
///
/// The bytes go to a temporary file next to `path` that is renamed over it
/// once flushed. On failure the temporary file is removed and `path` is left
/// as it was.
pub(crate) fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    let io_err = |source| PdfToolsError::IoWrite {
        path: path.display().to_string(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

// ============== Read PDF ==============

/// Parameters for reading a PDF as Markdown.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadPdfParams {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Pages to read (0-indexed). All pages when omitted.
    #[serde(default)]
    pub pages: Option<Vec<i32>>,
    /// If set, the text is also written to this file.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Resolve the requested page list into sorted, deduplicated indices.
fn select_pages(path: &Path, requested: Option<&[i32]>, page_count: i32) -> Result<Vec<i32>> {
    let Some(requested) = requested else {
        return Ok((0..page_count).collect());
    };
    if requested.is_empty() {
        return Err(PdfToolsError::invalid_range(format!(
            "pages list for {} is empty",
            path.display()
        )));
    }
    if let Some(bad) = requested.iter().find(|p| **p < 0 || **p >= page_count) {
        return Err(page_out_of_range(path, *bad, page_count));
    }
    let mut pages = requested.to_vec();
    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

/// Read a PDF and return its text as Markdown, one section per page.
pub fn read_pdf(params: ReadPdfParams) -> Result<String> {
    tracing::info!(path = %params.path.display(), pages = ?params.pages, "reading PDF");
    let doc = open_pdf(&params.path)?;
    let pages = select_pages(&params.path, params.pages.as_deref(), doc.page_count()?)?;

    let mut sections = Vec::with_capacity(pages.len());
    for index in pages {
        let page = doc.load_page(index)?;
        sections.push(page_to_markdown(&page, None)?);
    }
    let markdown = sections.join(PAGE_SEPARATOR);
    tracing::info!(chars = markdown.chars().count(), "converted PDF to Markdown");

    if let Some(output_path) = &params.output_path {
        tracing::info!(output = %output_path.display(), "saving Markdown");
        write_output(output_path, markdown.as_bytes())?;
    }

    Ok(markdown)
}

// ============== Crop PDF ==============

/// Parameters for extracting the text inside a page region.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CropPdfParams {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Page number (0-indexed).
    pub page: i32,
    /// Crop region in page coordinates (points, origin top-left).
    pub rect: Bounds,
}

/// Extract the Markdown text inside `rect` on one page.
pub fn crop_pdf(params: CropPdfParams) -> Result<String> {
    tracing::info!(
        path = %params.path.display(),
        page = params.page,
        rect = %params.rect,
        "cropping PDF text"
    );
    params.rect.validate()?;
    let doc = open_pdf(&params.path)?;
    let page = load_page(&doc, &params.path, params.page)?;
    let clip = params.rect.clip_to_page(&page_bounds(&page)?)?;
    tracing::debug!(clip = %clip, "clipped crop region");
    page_to_markdown(&page, Some(&clip))
}
