//! Rectangles in page coordinate space.
//!
//! Page coordinates are in points (1/72 inch) with the origin at the top-left
//! corner of the page and y growing downward, matching MuPDF's page space.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PdfToolsError, Result};

/// An axis-aligned rectangle given by its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    /// Left edge (x0).
    pub left: f32,
    /// Top edge (y0).
    pub top: f32,
    /// Right edge (x1).
    pub right: f32,
    /// Bottom edge (y1).
    pub bottom: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Reject non-finite, degenerate or inverted rectangles.
    pub fn validate(&self) -> Result<()> {
        let edges = [self.left, self.top, self.right, self.bottom];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(PdfToolsError::invalid_range(format!(
                "rect {} has non-finite edges",
                self
            )));
        }
        if self.left >= self.right || self.top >= self.bottom {
            return Err(PdfToolsError::invalid_range(format!(
                "rect {} must satisfy left < right and top < bottom",
                self
            )));
        }
        Ok(())
    }

    /// Overlapping area of two rectangles, `None` when they only touch or are disjoint.
    pub fn intersect(&self, other: &Bounds) -> Option<Bounds> {
        let clipped = Bounds {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (clipped.left < clipped.right && clipped.top < clipped.bottom).then_some(clipped)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Validate `self` as a crop request and clip it to `page`.
    pub fn clip_to_page(&self, page: &Bounds) -> Result<Bounds> {
        self.validate()?;
        self.intersect(page).ok_or_else(|| {
            PdfToolsError::invalid_range(format!(
                "rect {} does not intersect page bounds {}",
                self, page
            ))
        })
    }
}

impl From<mupdf::Rect> for Bounds {
    fn from(rect: mupdf::Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{left: {}, top: {}, right: {}, bottom: {}}}",
            self.left, self.top, self.right, self.bottom
        )
    }
}
