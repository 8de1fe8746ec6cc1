//! Standard PDF font metrics
//!
//! Reports use the built-in Helvetica and Helvetica-Bold Type1 fonts, so
//! nothing needs to be embedded. Text is measured with the AFM widths for
//! printable ASCII; everything else is measured as a digit-width glyph.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Resource name of the regular face in page resources
pub const REGULAR_RESOURCE: &str = "F1";
/// Resource name of the bold face in page resources
pub const BOLD_RESOURCE: &str = "F2";

const DEFAULT_WIDTH: u16 = 556;

/// Helvetica widths for chars 32-126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold widths for chars 32-126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Font face used for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    /// Name under which the face is registered in page resources
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => REGULAR_RESOURCE,
            FontFace::Bold => BOLD_RESOURCE,
        }
    }

    fn base_font(&self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"Helvetica",
            FontFace::Bold => b"Helvetica-Bold",
        }
    }

    fn char_width(&self, c: char) -> u16 {
        let table = match self {
            FontFace::Regular => &HELVETICA_WIDTHS,
            FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }
}

/// Width of `text` in points when set in `face` at `size`
pub fn text_width(face: FontFace, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| face.char_width(c) as u32).sum();
    units as f32 * size / 1000.0
}

/// Encode text for a WinAnsiEncoding simple font
///
/// Latin-1 maps directly; other characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2026 => 0x85,
            0x20AC => 0x80,
            0x09 => b' ',
            _ => b'?',
        })
        .collect()
}

/// Encode text as a hex string operand, e.g. `<48656C6C6F>`
pub fn hex_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2 + 2);
    out.push('<');
    for byte in encode_win_ansi(text) {
        out.push_str(&format!("{:02X}", byte));
    }
    out.push('>');
    out
}

/// Append operators that draw `text` with its baseline starting at (x, y)
pub fn push_text(content: &mut String, face: FontFace, size: f32, x: f32, y: f32, text: &str) {
    content.push_str("BT\n");
    content.push_str(&format!("/{} {} Tf\n", face.resource_name(), size));
    content.push_str(&format!("1 0 0 1 {:.2} {:.2} Tm\n", x, y));
    content.push_str(&format!("{} Tj\n", hex_string(text)));
    content.push_str("ET\n");
}

/// Break text into lines no wider than `max_width`
///
/// Breaks at whitespace; a word wider than a whole line is split between
/// characters. Explicit line breaks in the text are kept. Always returns at
/// least one line.
pub fn wrap_text(face: FontFace, text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width(face, &candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width(face, word, size) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = split_by_width(face, word, size, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_by_width(face: FontFace, word: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let w = face.char_width(c) as f32 * size / 1000.0;
        if width + w > max_width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(c);
        width += w;
    }
    pieces.push(current);
    pieces
}

/// Shorten `text` so that it fits in `max_width`, ending with "..."
pub fn truncate_to_width(face: FontFace, text: &str, size: f32, max_width: f32) -> String {
    if text_width(face, text, size) <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let budget = max_width - text_width(face, ellipsis, size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let w = face.char_width(c) as f32 * size / 1000.0;
        if width + w > budget {
            break;
        }
        out.push(c);
        width += w;
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push_str(ellipsis);
    out
}

/// Add a standard Type1 font object to the document
pub fn add_standard_font(doc: &mut Document, face: FontFace) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(face.base_font().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    doc.add_object(Object::Dictionary(font))
}

/// Font resource dictionary holding both faces
pub fn font_resources(doc: &mut Document) -> Dictionary {
    let regular = add_standard_font(doc, FontFace::Regular);
    let bold = add_standard_font(doc, FontFace::Bold);

    let mut fonts = Dictionary::new();
    fonts.set(REGULAR_RESOURCE, Object::Reference(regular));
    fonts.set(BOLD_RESOURCE, Object::Reference(bold));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_uses_afm_metrics() {
        // "Hi" = H(722) + i(222) in Helvetica
        assert!((text_width(FontFace::Regular, "Hi", 10.0) - 9.44).abs() < 0.001);
        // Bold is wider for the same text
        assert!(text_width(FontFace::Bold, "Hi", 10.0) > text_width(FontFace::Regular, "Hi", 10.0));
        assert_eq!(text_width(FontFace::Regular, "", 12.0), 0.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Abc"), b"Abc".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{2014}"), vec![0x97]);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string("Hi"), "<4869>");
        assert_eq!(hex_string("(x)"), "<287829>");
    }

    #[test]
    fn test_wrap_text_breaks_at_spaces() {
        let lines = wrap_text(FontFace::Regular, "one two three four", 10.0, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(FontFace::Regular, line, 10.0) <= 40.0);
        }
        assert_eq!(lines.join(" "), "one two three four");
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        let lines = wrap_text(FontFace::Regular, "abcdefghijklmnopqrstuvwxyz", 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn test_wrap_text_keeps_line_breaks_and_empty() {
        assert_eq!(wrap_text(FontFace::Regular, "a\nb", 10.0, 100.0), vec!["a", "b"]);
        assert_eq!(wrap_text(FontFace::Regular, "", 10.0, 100.0), vec![""]);
    }

    #[test]
    fn test_truncate_to_width() {
        let text = "A rather long description of a test case";
        let short = truncate_to_width(FontFace::Regular, text, 10.0, 60.0);
        assert!(short.ends_with("..."));
        assert!(text_width(FontFace::Regular, &short, 10.0) <= 60.0);
        assert_eq!(truncate_to_width(FontFace::Regular, "ok", 10.0, 60.0), "ok");
    }
}
