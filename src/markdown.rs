//! Markdown conversion of MuPDF structured text.
//!
//! Headings are inferred from font size: the size carrying the most
//! characters is body text, and up to six larger sizes become `#` through
//! `######` in descending order. Lines of the same block are joined into one
//! paragraph. Tables and images are not reconstructed.

use std::collections::HashMap;

use mupdf::{Page, TextPage, TextPageFlags};

use crate::error::Result;
use crate::geometry::Bounds;

/// Deepest heading level emitted.
const MAX_HEADING_LEVEL: usize = 6;

/// One line of text with the font size most of its characters use.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    /// Index of the text block the line belongs to.
    pub block: usize,
    pub text: String,
    /// Dominant font size in points.
    pub size: f32,
}

/// Sizes are compared in half-point steps.
fn size_key(size: f32) -> i32 {
    (size * 2.0).round() as i32
}

/// Key with the highest count, smallest key on ties.
fn dominant_key(counts: &HashMap<i32, usize>) -> Option<i32> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| *k)
}

/// Collect the lines of a text page, keeping only characters whose quad
/// centre lies inside `clip` when one is given.
pub fn collect_lines(text_page: &TextPage, clip: Option<&Bounds>) -> Vec<StyledLine> {
    let mut lines = Vec::new();

    for (block_index, block) in text_page.blocks().enumerate() {
        for line in block.lines() {
            let mut text = String::new();
            let mut sizes: HashMap<i32, usize> = HashMap::new();

            for ch in line.chars() {
                let Some(c) = ch.char() else { continue };
                if let Some(clip) = clip {
                    let quad = ch.quad();
                    let cx = (quad.ul.x + quad.ur.x + quad.ll.x + quad.lr.x) / 4.0;
                    let cy = (quad.ul.y + quad.ur.y + quad.ll.y + quad.lr.y) / 4.0;
                    if !clip.contains_point(cx, cy) {
                        continue;
                    }
                }
                if !c.is_whitespace() {
                    *sizes.entry(size_key(ch.size())).or_default() += 1;
                }
                text.push(c);
            }

            if let Some(key) = dominant_key(&sizes) {
                lines.push(StyledLine {
                    block: block_index,
                    text,
                    size: key as f32 / 2.0,
                });
            }
        }
    }

    lines
}

/// Map heading font sizes (in half-point keys) to heading levels.
fn heading_levels(lines: &[StyledLine]) -> HashMap<i32, usize> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for line in lines {
        let chars = line.text.chars().filter(|c| !c.is_whitespace()).count();
        *counts.entry(size_key(line.size)).or_default() += chars;
    }

    let Some(body) = dominant_key(&counts) else {
        return HashMap::new();
    };

    let mut larger: Vec<i32> = counts.keys().copied().filter(|k| *k > body).collect();
    larger.sort_unstable_by(|a, b| b.cmp(a));
    larger
        .into_iter()
        .take(MAX_HEADING_LEVEL)
        .enumerate()
        .map(|(i, key)| (key, i + 1))
        .collect()
}

fn append_line(paragraph: &mut String, text: &str) {
    if paragraph.is_empty() {
        paragraph.push_str(text);
        return;
    }
    let continues_word = text.chars().next().is_some_and(|c| c.is_lowercase());
    if paragraph.ends_with('-') && continues_word {
        paragraph.pop();
    } else {
        paragraph.push(' ');
    }
    paragraph.push_str(text);
}

/// Render styled lines as Markdown.
pub fn lines_to_markdown(lines: &[StyledLine]) -> String {
    let levels = heading_levels(lines);
    let mut parts: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut current_block = None;

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() {
            continue;
        }

        if current_block != Some(line.block) {
            if !paragraph.is_empty() {
                parts.push(std::mem::take(&mut paragraph));
            }
            current_block = Some(line.block);
        }

        if let Some(level) = levels.get(&size_key(line.size)) {
            if !paragraph.is_empty() {
                parts.push(std::mem::take(&mut paragraph));
            }
            parts.push(format!("{} {}", "#".repeat(*level), text));
            continue;
        }

        append_line(&mut paragraph, text);
    }
    if !paragraph.is_empty() {
        parts.push(paragraph);
    }

    if parts.is_empty() {
        return String::new();
    }

    // Monospace runs would otherwise leak fence markers into the output.
    let mut markdown = parts.join("\n\n").replace("```", "");
    markdown.push('\n');
    markdown
}

/// Convert a page, or the part of it inside `clip`, to Markdown.
pub fn page_to_markdown(page: &Page, clip: Option<&Bounds>) -> Result<String> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;
    let lines = collect_lines(&text_page, clip);
    tracing::debug!(lines = lines.len(), clipped = clip.is_some(), "collected text lines");
    Ok(lines_to_markdown(&lines))
}

/// Plain text of a page, one line per text line.
pub fn page_to_plain_text(page: &Page) -> Result<String> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;
    let mut result = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            result.extend(line.chars().filter_map(|c| c.char()));
            result.push('\n');
        }
        result.push('\n');
    }
    Ok(result)
}
