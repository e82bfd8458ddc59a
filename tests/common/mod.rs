//! Builds small PDF fixtures on the fly.
//!
//! Pages use the standard Helvetica font, so no font data is embedded.
//! Text positions are given in top-left page coordinates, like the tools use.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A single line of text placed with its baseline at (`x`, `y`).
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

impl TextRun {
    pub fn new(x: f32, y: f32, size: f32, text: &str) -> Self {
        Self {
            x,
            y,
            size,
            text: text.to_string(),
        }
    }
}

pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub runs: Vec<TextRun>,
}

impl PageSpec {
    pub fn letter(runs: Vec<TextRun>) -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            runs,
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

fn content_stream(page: &PageSpec) -> String {
    let mut content = String::new();
    for run in &page.runs {
        content.push_str(&format!(
            "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
            run.size,
            run.x,
            page.height - run.y,
            escape(&run.text)
        ));
    }
    content
}

/// An outline (bookmark) entry pointing at a zero-based page.
pub struct OutlineSpec {
    pub title: String,
    pub page: usize,
    pub children: Vec<OutlineSpec>,
}

impl OutlineSpec {
    pub fn new(title: &str, page: usize, children: Vec<OutlineSpec>) -> Self {
        Self {
            title: title.to_string(),
            page,
            children,
        }
    }

    /// Number of objects this entry and its descendants occupy.
    fn len(&self) -> usize {
        1 + self.children.iter().map(OutlineSpec::len).sum::<usize>()
    }
}

fn page_object_id(page: usize) -> usize {
    4 + 2 * page
}

/// Id of the last entry in `items` when the first one is `first_id`.
fn last_sibling_id(items: &[OutlineSpec], first_id: usize) -> usize {
    first_id
        + items[..items.len() - 1]
            .iter()
            .map(OutlineSpec::len)
            .sum::<usize>()
}

/// Append outline item dictionaries in preorder, which is also id order.
fn push_outline_items(
    objects: &mut Vec<String>,
    items: &[OutlineSpec],
    parent: usize,
    pages: &[PageSpec],
) {
    let mut ids = Vec::with_capacity(items.len());
    let mut next = objects.len() + 1;
    for item in items {
        ids.push(next);
        next += item.len();
    }

    for (i, item) in items.iter().enumerate() {
        let id = ids[i];
        let mut dict = format!(
            "<< /Title ({}) /Parent {} 0 R /Dest [{} 0 R /XYZ 0 {} 0]",
            escape(&item.title),
            parent,
            page_object_id(item.page),
            pages[item.page].height
        );
        if i > 0 {
            dict.push_str(&format!(" /Prev {} 0 R", ids[i - 1]));
        }
        if i + 1 < items.len() {
            dict.push_str(&format!(" /Next {} 0 R", ids[i + 1]));
        }
        if !item.children.is_empty() {
            dict.push_str(&format!(
                " /First {} 0 R /Last {} 0 R /Count {}",
                id + 1,
                last_sibling_id(&item.children, id + 1),
                item.len() - 1
            ));
        }
        dict.push_str(" >>");
        objects.push(dict);
        push_outline_items(objects, &item.children, id, pages);
    }
}

/// Serialize pages into a complete PDF with a correct cross-reference table.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    build_pdf_with(pages, &[], false)
}

/// Like [`build_pdf`], with an optional outline tree and optional standard
/// security handler.
///
/// The encryption dictionary uses an owner and user key that no password
/// opens, so readers must ask for one.
pub fn build_pdf_with(pages: &[PageSpec], outline: &[OutlineSpec], encrypted: bool) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_object_id(i)))
        .collect();
    let outline_root = page_object_id(pages.len());

    if outline.is_empty() {
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    } else {
        objects.push(format!(
            "<< /Type /Catalog /Pages 2 0 R /Outlines {} 0 R /PageMode /UseOutlines >>",
            outline_root
        ));
    }
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, page) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page.width,
            page.height,
            5 + 2 * i
        ));
        let content = content_stream(page);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    if !outline.is_empty() {
        objects.push(format!(
            "<< /Type /Outlines /First {} 0 R /Last {} 0 R /Count {} >>",
            outline_root + 1,
            last_sibling_id(outline, outline_root + 1),
            outline.iter().map(OutlineSpec::len).sum::<usize>()
        ));
        push_outline_items(&mut objects, outline, outline_root, pages);
    }

    let mut trailer_extra = String::new();
    if encrypted {
        objects.push(format!(
            "<< /Filter /Standard /V 1 /R 2 /Length 40 /O <{}> /U <{}> /P -4 >>",
            "11".repeat(32),
            "00".repeat(32)
        ));
        trailer_extra = format!(
            " /Encrypt {} 0 R /ID [<{id}> <{id}>]",
            objects.len(),
            id = "0123456789abcdef".repeat(2)
        );
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R{} >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            trailer_extra,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).unwrap();
    path
}

/// One US Letter page: "Hello World" near the top-left corner and a footer
/// line near the bottom.
pub fn hello_world_pdf(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "hello.pdf",
        &[PageSpec::letter(vec![
            TextRun::new(20.0, 50.0, 12.0, "Hello World"),
            TextRun::new(20.0, 750.0, 12.0, "Footer note"),
        ])],
    )
}

/// Three US Letter pages labelled "Page one" to "Page three".
pub fn three_page_pdf(dir: &Path) -> PathBuf {
    let pages: Vec<PageSpec> = ["one", "two", "three"]
        .iter()
        .map(|label| {
            PageSpec::letter(vec![TextRun::new(
                72.0,
                72.0,
                12.0,
                &format!("Page {}", label),
            )])
        })
        .collect();
    write_pdf(dir, "three.pdf", &pages)
}

/// A Letter page followed by an A4 page.
pub fn mixed_size_pdf(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "mixed.pdf",
        &[
            PageSpec::letter(vec![TextRun::new(72.0, 72.0, 12.0, "Letter")]),
            PageSpec {
                width: 595.0,
                height: 842.0,
                runs: vec![TextRun::new(72.0, 72.0, 12.0, "A4")],
            },
        ],
    )
}

/// A page with a large title over several body lines.
pub fn report_pdf(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "report.pdf",
        &[PageSpec::letter(vec![
            TextRun::new(72.0, 80.0, 28.0, "Quarterly Report"),
            TextRun::new(72.0, 140.0, 11.0, "Revenue grew in every region this quarter."),
            TextRun::new(72.0, 300.0, 11.0, "Costs remained flat compared with last year."),
        ])],
    )
}

/// Three pages with a two-level outline:
/// "Chapter 1" (page 0) holding "Section 1.1" (page 1), then "Chapter 2" (page 2).
pub fn outlined_pdf(dir: &Path) -> PathBuf {
    let pages: Vec<PageSpec> = ["Introduction", "Details", "Conclusion"]
        .iter()
        .map(|text| PageSpec::letter(vec![TextRun::new(72.0, 72.0, 12.0, text)]))
        .collect();
    let outline = vec![
        OutlineSpec::new(
            "Chapter 1",
            0,
            vec![OutlineSpec::new("Section 1.1", 1, Vec::new())],
        ),
        OutlineSpec::new("Chapter 2", 2, Vec::new()),
    ];
    let path = dir.join("outlined.pdf");
    std::fs::write(&path, build_pdf_with(&pages, &outline, false)).unwrap();
    path
}

/// A one-page document protected by a password.
pub fn encrypted_pdf(dir: &Path) -> PathBuf {
    let pages = [PageSpec::letter(vec![TextRun::new(72.0, 72.0, 12.0, "Secret")])];
    let path = dir.join("encrypted.pdf");
    std::fs::write(&path, build_pdf_with(&pages, &[], true)).unwrap();
    path
}

/// A single 3000 x 3000 pt page with text in its top-left corner.
pub fn large_page_pdf(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "large.pdf",
        &[PageSpec {
            width: 3000.0,
            height: 3000.0,
            runs: vec![TextRun::new(2.0, 8.0, 6.0, "Corner")],
        }],
    )
}

/// A file with a PDF extension that is not a PDF.
pub fn garbage_pdf(dir: &Path) -> PathBuf {
    let path = dir.join("garbage.pdf");
    std::fs::write(&path, b"this is plainly not a PDF document").unwrap();
    path
}
