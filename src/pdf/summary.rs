//! Summary page: the report's table of contents
//!
//! Lists every section with its start page. Each entry becomes a clickable
//! link once the report is merged, see [`crate::pdf::outline::apply_links`].

use std::ops::Range;

use chrono::NaiveDate;
use lopdf::Document;

use crate::date::format_date;
use crate::error::Result;
use crate::layout::{ContentArea, PageDimensions};
use crate::pdf::document::build_document;
use crate::pdf::font::{push_text, text_width, truncate_to_width, FontFace};
use crate::pdf::footer::{footer_content, FooterOptions};

/// Options for the summary page
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub title: String,
    /// Printed under the title as "Generated <date>"
    pub date: Option<NaiveDate>,
    pub title_font_size: f32,
    pub entry_font_size: f32,
    /// Distance between entry baselines
    pub line_spacing: f32,
    /// Indent per nesting level
    pub indent: f32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            title: "Test Automation Summary".to_string(),
            date: None,
            title_font_size: 14.0,
            entry_font_size: 12.0,
            line_spacing: 20.0,
            indent: 18.0,
        }
    }
}

impl SummaryOptions {
    /// Space above the first entry: title, optional date line and a gap
    fn heading_height(&self) -> f32 {
        let date_line = if self.date.is_some() { self.entry_font_size * 1.5 } else { 0.0 };
        self.title_font_size * 1.2 + date_line + self.line_spacing
    }

    /// Entries that fit on one summary page
    pub fn entries_per_page(&self, area: &ContentArea) -> usize {
        let usable = area.height - self.heading_height();
        ((usable / self.line_spacing).floor() as usize).max(1)
    }
}

/// One line of the summary
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub label: String,
    /// 0 for workbooks, 1 for sheets
    pub depth: usize,
    /// Global 1-based page the entry points at
    pub target_page: usize,
}

/// A clickable area on a summary page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    /// 0-based summary page the link sits on
    pub summary_page: usize,
    /// [x1, y1, x2, y2] in points
    pub rect: [f32; 4],
    /// Global 1-based destination page
    pub target_page: usize,
}

/// Number of summary pages needed for `entry_count` entries
pub fn summary_page_count(entry_count: usize, options: &SummaryOptions, area: &ContentArea) -> usize {
    let per_page = options.entries_per_page(area);
    entry_count.div_ceil(per_page).max(1)
}

fn page_ranges(entry_count: usize, per_page: usize) -> Vec<Range<usize>> {
    if entry_count == 0 {
        return vec![0..0];
    }
    (0..entry_count)
        .step_by(per_page)
        .map(|start| start..(start + per_page).min(entry_count))
        .collect()
}

/// Render the summary pages
///
/// Returns the document and one link target per entry.
pub fn render_summary(
    entries: &[SummaryEntry],
    options: &SummaryOptions,
    page: &PageDimensions,
    area: &ContentArea,
    footer: &FooterOptions,
    total_pages: usize,
) -> Result<(Document, Vec<LinkTarget>)> {
    let per_page = options.entries_per_page(area);
    let mut contents = Vec::new();
    let mut links = Vec::with_capacity(entries.len());

    for (page_index, range) in page_ranges(entries.len(), per_page).into_iter().enumerate() {
        let mut content = String::from("0 g\n");

        let title = if page_index == 0 {
            options.title.clone()
        } else {
            format!("{} (continued)", options.title)
        };
        let mut y = area.top() - options.title_font_size;
        push_text(&mut content, FontFace::Bold, options.title_font_size, area.left, y, &title);

        if let Some(ref date) = options.date {
            y -= options.entry_font_size * 1.5;
            let line = format!("Generated {}", format_date(date));
            push_text(&mut content, FontFace::Regular, options.entry_font_size, area.left, y, &line);
        }
        y -= options.line_spacing + options.title_font_size * 0.2;

        for entry in &entries[range] {
            links.push(push_entry(&mut content, entry, options, area, y, page_index));
            y -= options.line_spacing;
        }

        content.push_str(&footer_content(footer, page_index + 1, total_pages, page.width_pt()));
        contents.push(content);
    }

    let doc = build_document(page, contents)?;
    Ok((doc, links))
}

fn push_entry(
    content: &mut String,
    entry: &SummaryEntry,
    options: &SummaryOptions,
    area: &ContentArea,
    baseline: f32,
    summary_page: usize,
) -> LinkTarget {
    let size = options.entry_font_size;
    let face = FontFace::Regular;
    let x = area.left + entry.depth as f32 * options.indent;

    let number = entry.target_page.to_string();
    let number_width = text_width(face, &number, size);
    let number_x = area.right() - number_width;

    let label_room = (number_x - x - 4.0 * size).max(size);
    let label = truncate_to_width(face, &entry.label, size, label_room);
    let label_end = x + text_width(face, &label, size);

    push_text(content, face, size, x, baseline, &label);

    let dot_width = text_width(face, ".", size);
    let gap = size / 2.0;
    let leader_room = number_x - gap - (label_end + gap);
    if leader_room > dot_width {
        let dots = ".".repeat((leader_room / dot_width).floor() as usize);
        let dots_x = number_x - gap - text_width(face, &dots, size);
        push_text(content, face, size, dots_x, baseline, &dots);
    }

    push_text(content, face, size, number_x, baseline, &number);

    LinkTarget {
        summary_page,
        rect: [
            x,
            baseline - size * 0.3,
            area.right(),
            baseline + size,
        ],
        target_page: entry.target_page,
    }
}
