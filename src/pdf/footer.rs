//! Page footers
//!
//! Footers are drawn straight into each page's content stream while the page
//! is rendered. Page numbers are report-wide: the summary pages count too.

use chrono::NaiveDate;

use crate::date::format_date;
use crate::pdf::font::{push_text, text_width, FontFace};

/// Baseline of the footer, in points above the bottom edge
const FOOTER_BASELINE: f32 = 30.0;
/// Horizontal inset of the left and right footer sections
const FOOTER_INSET: f32 = 50.0;

/// Options for the footer drawn on every page
#[derive(Debug, Clone)]
pub struct FooterOptions {
    /// Footer left section content
    pub left: Option<String>,
    /// Footer center section content
    pub center: Option<String>,
    /// Whether to show "Page N of M" on the right
    pub show_page_numbers: bool,
    /// Date substituted for `[date]`
    pub date: Option<NaiveDate>,
    /// Footer font size in points
    pub font_size: f32,
}

impl Default for FooterOptions {
    fn default() -> Self {
        Self {
            left: None,
            center: None,
            show_page_numbers: true,
            date: None,
            font_size: 9.0,
        }
    }
}

impl FooterOptions {
    /// Whether anything would be drawn at all
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && !self.show_page_numbers
    }

    /// Height of the band the footer occupies, measured from the bottom edge
    pub fn band_height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            FOOTER_BASELINE + self.font_size * 2.0
        }
    }
}

/// Replace `[page]`, `[pages]` and `[date]` placeholders
pub fn expand_placeholders(text: &str, page: usize, total_pages: usize, date: Option<&NaiveDate>) -> String {
    let date_text = date.map(format_date).unwrap_or_default();
    text.replace("[pages]", &total_pages.to_string())
        .replace("[page]", &page.to_string())
        .replace("[date]", &date_text)
}

/// Generate PDF content stream operators for one page footer
pub fn footer_content(
    options: &FooterOptions,
    page_number: usize,
    total_pages: usize,
    page_width: f32,
) -> String {
    let mut content = String::new();
    if options.is_empty() {
        return content;
    }

    let size = options.font_size;
    let date = options.date.as_ref();

    content.push_str("0 g\n");

    if let Some(ref left) = options.left {
        let text = expand_placeholders(left, page_number, total_pages, date);
        push_text(&mut content, FontFace::Regular, size, FOOTER_INSET, FOOTER_BASELINE, &text);
    }

    if let Some(ref center) = options.center {
        let text = expand_placeholders(center, page_number, total_pages, date);
        let x = (page_width - text_width(FontFace::Regular, &text, size)) / 2.0;
        push_text(&mut content, FontFace::Regular, size, x, FOOTER_BASELINE, &text);
    }

    if options.show_page_numbers {
        let text = format!("Page {} of {}", page_number, total_pages);
        let x = page_width - FOOTER_INSET - text_width(FontFace::Regular, &text, size);
        push_text(&mut content, FontFace::Regular, size, x, FOOTER_BASELINE, &text);
    }

    content
}
