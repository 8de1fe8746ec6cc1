//! Rendering a laid-out table section to PDF pages

use lopdf::Document;

use crate::error::Result;
use crate::layout::{ContentArea, PageDimensions};
use crate::pdf::document::build_document;
use crate::pdf::font::{push_text, text_width, truncate_to_width, FontFace};
use crate::pdf::footer::{footer_content, FooterOptions};
use crate::pdf::table::{RowLayout, TableLayout, TablePage, TableStyle};

/// A table section ready to render
#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// Heading drawn above the table on the first page
    pub title: String,
    pub page: PageDimensions,
    pub area: ContentArea,
    pub layout: TableLayout,
}

impl SectionSpec {
    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }
}

/// Report-wide settings shared by every rendered section
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub style: &'a TableStyle,
    pub footer: &'a FooterOptions,
    /// Global page number of the section's first page
    pub first_page_number: usize,
    /// Total pages in the finished report
    pub total_pages: usize,
}

/// Render a section into a standalone document
pub fn render_section(section: &SectionSpec, ctx: &RenderContext<'_>) -> Result<Document> {
    let contents = section
        .layout
        .pages
        .iter()
        .enumerate()
        .map(|(index, table_page)| {
            let mut content = page_content(section, table_page, ctx.style);
            content.push_str(&footer_content(
                ctx.footer,
                ctx.first_page_number + index,
                ctx.total_pages,
                section.page.width_pt(),
            ));
            content
        })
        .collect();

    build_document(&section.page, contents)
}

fn page_content(section: &SectionSpec, table_page: &TablePage, style: &TableStyle) -> String {
    let layout = &section.layout;
    let area = &section.area;
    let mut content = String::new();

    if table_page.has_title {
        let title = truncate_to_width(FontFace::Bold, &section.title, style.title_font_size, area.width);
        let baseline = area.top() - style.title_font_size;
        content.push_str("0 g\n");
        push_text(&mut content, FontFace::Bold, style.title_font_size, area.left, baseline, &title);
    }

    let x0 = area.left + ((area.width - layout.table_width()) / 2.0).max(0.0);
    let mut row_tops = Vec::new();
    let mut y = table_page.table_top;

    if let Some(ref header) = layout.header {
        content.push_str(&format!(
            "{} g\n{:.2} {:.2} {:.2} {:.2} re f\n",
            style.header_background,
            x0,
            y - header.height,
            layout.table_width(),
            header.height
        ));
        content.push_str(&format!("{} g\n", style.header_text));
        push_row_text(&mut content, header, &layout.column_widths, x0, y, FontFace::Bold, style.header_font_size, style);
        row_tops.push(y);
        y -= header.height;
    }

    content.push_str("0 g\n");
    for row in &layout.rows[table_page.rows.clone()] {
        push_row_text(&mut content, row, &layout.column_widths, x0, y, FontFace::Regular, style.body_font_size, style);
        row_tops.push(y);
        y -= row.height;
    }

    if !row_tops.is_empty() {
        push_grid(&mut content, &layout.column_widths, x0, &row_tops, y, style.grid_width);
    }

    content
}

#[allow(clippy::too_many_arguments)]
fn push_row_text(
    content: &mut String,
    row: &RowLayout,
    widths: &[f32],
    x0: f32,
    top: f32,
    face: FontFace,
    size: f32,
    style: &TableStyle,
) {
    let line_height = size * style.leading;
    let mut x = x0;

    for (lines, &width) in row.cells.iter().zip(widths) {
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_top = top - style.padding_y - i as f32 * line_height;
            let baseline = line_top - (line_height + size * 0.7) / 2.0;
            let text_x = x + (width - text_width(face, line, size)) / 2.0;
            push_text(content, face, size, text_x, baseline, line);
        }
        x += width;
    }
}

/// Stroke the grid: one horizontal line per row edge, one vertical per column edge
fn push_grid(content: &mut String, widths: &[f32], x0: f32, row_tops: &[f32], bottom: f32, line_width: f32) {
    let right = x0 + widths.iter().sum::<f32>();
    let top = row_tops[0];

    content.push_str(&format!("0 G\n{} w\n", line_width));

    for &y in row_tops.iter().chain(std::iter::once(&bottom)) {
        content.push_str(&format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x0, y, right, y));
    }

    let mut x = x0;
    content.push_str(&format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x, top, x, bottom));
    for width in widths {
        x += width;
        content.push_str(&format!("{:.2} {:.2} m {:.2} {:.2} l S\n", x, top, x, bottom));
    }
}
