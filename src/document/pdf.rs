use std::fmt::Write;

use super::{Document, DocumentRenderer, Page, RenderError};

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const BODY_SIZE: u32 = 10;
const BODY_LEADING: u32 = 14;
const HEADING_SIZE: u32 = 14;
const HEADING_LEADING: u32 = 22;
/// Courier advances 0.6 em per glyph.
const LINE_CHARS: usize = ((PAGE_WIDTH - 2 * MARGIN) * 10 / (BODY_SIZE * 6)) as usize;

/// Writes PDF 1.4 using the built-in Courier font, so no font data is embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

struct Line {
    size: u32,
    leading: u32,
    text: String,
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError> {
        if document.pages.is_empty() {
            return Err(RenderError::Empty);
        }

        let physical: Vec<Vec<Line>> = document
            .pages
            .iter()
            .flat_map(|page| paginate(layout(page)))
            .collect();

        // 1 catalog, 2 pages tree, 3 font, 4 info, then page + content pairs
        let first_page_obj = 5;
        let mut objects: Vec<String> = Vec::with_capacity(4 + physical.len() * 2);

        let kids = (0..physical.len())
            .map(|i| format!("{} 0 R", first_page_obj + i * 2))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            physical.len()
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(format!("<< /Title ({}) >>", escape(&document.title)));

        for (idx, lines) in physical.iter().enumerate() {
            let content_obj = first_page_obj + idx * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_obj} 0 R >>"
            ));
            let stream = content_stream(lines)?;
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}endstream",
                stream.len()
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            write!(out, "{} 0 obj\n{body}\nendobj\n", idx + 1)?;
        }

        let xref_at = out.len();
        write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1)?;
        for offset in offsets {
            write!(out, "{offset:010} 00000 n \n")?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info 4 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )?;

        Ok(out.into_bytes())
    }
}

fn layout(page: &Page) -> Vec<Line> {
    let mut lines = vec![Line {
        size: HEADING_SIZE,
        leading: HEADING_LEADING,
        text: page.heading.clone(),
    }];
    let body = |text: String| Line {
        size: BODY_SIZE,
        leading: BODY_LEADING,
        text,
    };

    lines.extend(page.lines.iter().flat_map(|l| wrap(l)).map(body));
    if let Some(table) = &page.table {
        lines.push(body(String::new()));
        lines.extend(table.to_text_lines().iter().flat_map(|l| wrap(l)).map(body));
    }
    if !page.footer.is_empty() {
        lines.push(body(String::new()));
        lines.extend(page.footer.iter().flat_map(|l| wrap(l)).map(body));
    }
    lines
}

fn paginate(lines: Vec<Line>) -> Vec<Vec<Line>> {
    let usable = PAGE_HEIGHT - 2 * MARGIN;
    let mut pages = vec![Vec::new()];
    let mut used = 0;
    for line in lines {
        if used + line.leading > usable {
            pages.push(Vec::new());
            used = 0;
        }
        used += line.leading;
        if let Some(page) = pages.last_mut() {
            page.push(line);
        }
    }
    pages
}

fn content_stream(lines: &[Line]) -> Result<String, RenderError> {
    let mut stream = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        y -= line.leading;
        if line.text.is_empty() {
            continue;
        }
        writeln!(
            stream,
            "BT /F1 {} Tf 1 0 0 1 {MARGIN} {y} Tm ({}) Tj ET",
            line.size,
            escape(&line.text)
        )?;
    }
    Ok(stream)
}

fn wrap(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= LINE_CHARS {
        return vec![text.to_string()];
    }
    chars
        .chunks(LINE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
