//! Minimal PDF writer for tabular reports
//!
//! Writes uncompressed PDF 1.4 using the standard Helvetica fonts, so no font
//! files need to be embedded. Coordinates passed in are top-down (origin at
//! the top-left corner of the page) and converted to PDF user space here.
//!
//! Pages are append-only: opening a new page seals the previous one, and
//! sealed pages are never revisited.

use std::fmt::Write as _;

/// A4 width in points
pub const A4_WIDTH: f32 = 595.28;
/// A4 height in points
pub const A4_HEIGHT: f32 = 841.89;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4_PORTRAIT: PageSize = PageSize {
        width: A4_WIDTH,
        height: A4_HEIGHT,
    };

    pub const A4_LANDSCAPE: PageSize = PageSize {
        width: A4_HEIGHT,
        height: A4_WIDTH,
    };
}

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    fn components(&self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Rendered width of `text` in points
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                556
            }
        })
        .sum();
    units as f32 / 1000.0 * font_size
}

/// WinAnsiEncoding code for a non-ASCII character, if the fonts can show it
fn win_ansi_code(c: char) -> Option<u8> {
    match c {
        '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(c)).ok(),
        '\u{20AC}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        _ => None,
    }
}

/// Escape text for a PDF literal string. Characters outside WinAnsiEncoding
/// become `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => match win_ansi_code(c) {
                Some(code) => {
                    let _ = write!(out, "\\{:03o}", code);
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// Incrementally built PDF document
#[derive(Debug)]
pub struct PdfDocument {
    size: PageSize,
    sealed: Vec<String>,
    current: Option<String>,
}

impl PdfDocument {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            sealed: Vec::new(),
            current: None,
        }
    }

    /// Pages started so far, including the open one
    pub fn page_count(&self) -> usize {
        self.sealed.len() + usize::from(self.current.is_some())
    }

    /// Seal the open page (if any) and start a new one
    pub fn add_page(&mut self) {
        if let Some(done) = self.current.take() {
            self.sealed.push(done);
        }
        self.current = Some(String::new());
    }

    fn content(&mut self) -> &mut String {
        self.current.get_or_insert_with(String::new)
    }

    /// Fill a rectangle whose top-left corner is at (`x`, `y`)
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        let pdf_y = self.size.height - y - height;
        let (r, g, b) = color.components();
        let out = self.content();
        let _ = writeln!(
            out,
            "{:.3} {:.3} {:.3} rg {:.2} {:.2} {:.2} {:.2} re f",
            r, g, b, x, pdf_y, width, height
        );
    }

    /// Draw one line of text inside a box of `width` starting at (`x`, `y`)
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        font: Font,
        font_size: f32,
        color: Color,
        align: Align,
    ) {
        let offset = match align {
            Align::Left => 0.0,
            Align::Center => ((width - text_width(text, font_size)) / 2.0).max(0.0),
        };
        // Baseline sits roughly three quarters of the font size below the top
        let baseline = self.size.height - y - font_size * 0.75;
        let (r, g, b) = color.components();
        let escaped = escape_text(text);
        let out = self.content();
        let _ = writeln!(
            out,
            "BT {:.3} {:.3} {:.3} rg /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
            r,
            g,
            b,
            font.resource_name(),
            font_size,
            x + offset,
            baseline,
            escaped
        );
    }

    /// Seal the last page and serialize the whole document
    pub fn finish(mut self) -> Vec<u8> {
        if let Some(done) = self.current.take() {
            self.sealed.push(done);
        }
        if self.sealed.is_empty() {
            self.sealed.push(String::new());
        }

        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let page_count = self.sealed.len();
        // 1: catalog, 2: page tree, 3-4: fonts, then (page, content) pairs
        let page_id = |i: usize| 5 + 2 * i;
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", page_id(i)))
            .collect::<Vec<_>>()
            .join(" ");

        let mut push_object = |out: &mut Vec<u8>, body: &[u8]| {
            offsets.push(out.len());
            let id = offsets.len();
            out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        };

        push_object(&mut out, b"<< /Type /Catalog /Pages 2 0 R >>");
        push_object(
            &mut out,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {:.2} {:.2}] >>",
                kids, page_count, self.size.width, self.size.height
            )
            .as_bytes(),
        );
        push_object(
            &mut out,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        push_object(
            &mut out,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );

        for (i, content) in self.sealed.iter().enumerate() {
            push_object(
                &mut out,
                format!(
                    "<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    page_id(i) + 1
                )
                .as_bytes(),
            );
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content.as_bytes());
            stream.extend_from_slice(b"endstream");
            push_object(&mut out, &stream);
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}
