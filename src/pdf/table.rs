//! Table layout: column widths, row heights and pagination
//!
//! Layout is computed before anything is drawn so that every section's page
//! count is known up front. The summary page needs those counts to print
//! start pages and place links.

use std::ops::Range;

use tracing::debug;

use crate::layout::ContentArea;
use crate::pdf::font::{text_width, truncate_to_width, wrap_text, FontFace};
use crate::sheet::SheetTable;

/// Visual style of a table section
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    /// Body text size in points
    pub body_font_size: f32,
    /// Header text size in points
    pub header_font_size: f32,
    /// Section heading size in points
    pub title_font_size: f32,
    /// Space between the heading and the table
    pub title_spacing: f32,
    /// Header background gray level (0 = black, 1 = white)
    pub header_background: f32,
    /// Header text gray level
    pub header_text: f32,
    /// Grid line width
    pub grid_width: f32,
    /// Left and right cell padding
    pub padding_x: f32,
    /// Top and bottom cell padding
    pub padding_y: f32,
    /// Extra padding under the header text
    pub header_bottom_padding: f32,
    /// Line height as a multiple of the font size
    pub leading: f32,
    pub min_column_width: f32,
    pub max_column_width: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            body_font_size: 9.0,
            header_font_size: 10.0,
            title_font_size: 14.0,
            title_spacing: 10.0,
            header_background: 0.5,
            header_text: 0.96,
            grid_width: 1.0,
            padding_x: 4.0,
            padding_y: 3.0,
            header_bottom_padding: 12.0,
            leading: 1.2,
            min_column_width: 30.0,
            max_column_width: 220.0,
        }
    }
}

impl TableStyle {
    fn body_line_height(&self) -> f32 {
        self.body_font_size * self.leading
    }

    fn header_line_height(&self) -> f32 {
        self.header_font_size * self.leading
    }

    /// Vertical space taken by the section heading
    pub fn title_height(&self) -> f32 {
        self.title_font_size * self.leading + self.title_spacing
    }
}

/// One laid-out row: wrapped lines per cell and the row height
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub cells: Vec<Vec<String>>,
    pub height: f32,
}

/// Rows placed on one page
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    /// Indices into [`TableLayout::rows`]
    pub rows: Range<usize>,
    /// Whether the section heading is drawn on this page
    pub has_title: bool,
    /// Y coordinate of the top edge of the table on this page
    pub table_top: f32,
}

/// A fully laid-out table section
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub column_widths: Vec<f32>,
    pub header: Option<RowLayout>,
    pub rows: Vec<RowLayout>,
    pub pages: Vec<TablePage>,
}

impl TableLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn table_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// Width each column would like, clamped to the style's bounds
pub fn natural_column_widths(table: &SheetTable, style: &TableStyle) -> Vec<f32> {
    let columns = table.column_count();
    let mut widths = vec![0.0_f32; columns];

    let mut measure = |cells: &[String], face: FontFace, size: f32| {
        for (i, cell) in cells.iter().enumerate().take(columns) {
            let widest = cell
                .lines()
                .map(|line| text_width(face, line.trim_end(), size))
                .fold(0.0, f32::max);
            widths[i] = widths[i].max(widest);
        }
    };

    if let Some(ref header) = table.header {
        measure(header, FontFace::Bold, style.header_font_size);
    }
    for row in &table.rows {
        measure(row, FontFace::Regular, style.body_font_size);
    }

    widths
        .into_iter()
        .map(|w| (w + 2.0 * style.padding_x).clamp(style.min_column_width, style.max_column_width))
        .collect()
}

/// Column widths that fit within `available` points
///
/// Natural widths are used when they fit. Otherwise the widest columns are
/// capped at a common width chosen so that the total equals `available`;
/// narrower columns keep their natural width.
pub fn compute_column_widths(table: &SheetTable, style: &TableStyle, available: f32) -> Vec<f32> {
    let natural = natural_column_widths(table, style);
    fit_widths(&natural, style.min_column_width, available)
}

fn fit_widths(natural: &[f32], min_width: f32, available: f32) -> Vec<f32> {
    let n = natural.len();
    if n == 0 {
        return Vec::new();
    }

    let total: f32 = natural.iter().sum();
    if total <= available {
        return natural.to_vec();
    }

    if min_width * n as f32 >= available {
        return vec![available / n as f32; n];
    }

    let mut sorted = natural.to_vec();
    sorted.sort_by(f32::total_cmp);

    let mut remaining = available;
    let mut cap = available / n as f32;
    for (i, &width) in sorted.iter().enumerate() {
        cap = remaining / (n - i) as f32;
        if width > cap {
            break;
        }
        remaining -= width;
    }

    natural.iter().map(|&w| w.min(cap)).collect()
}

fn layout_row(
    cells: &[String],
    widths: &[f32],
    face: FontFace,
    size: f32,
    line_height: f32,
    vertical_padding: f32,
    padding_x: f32,
) -> RowLayout {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            wrap_text(face, text, size, (width - 2.0 * padding_x).max(1.0))
        })
        .collect();

    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    RowLayout {
        cells: wrapped,
        height: lines as f32 * line_height + vertical_padding,
    }
}

/// Cut a row down so that it fits in `limit` points of height
fn clip_row(row: &mut RowLayout, limit: f32, style: &TableStyle, widths: &[f32]) {
    if row.height <= limit {
        return;
    }

    let line_height = style.body_line_height();
    let vertical_padding = 2.0 * style.padding_y;
    let (face, size, padding_x) = (FontFace::Regular, style.body_font_size, style.padding_x);
    let max_lines = (((limit - vertical_padding) / line_height).floor() as usize).max(1);
    for (cell, &width) in row.cells.iter_mut().zip(widths) {
        if cell.len() > max_lines {
            cell.truncate(max_lines);
            if let Some(last) = cell.last_mut() {
                let marked = format!("{} ...", last);
                *last = truncate_to_width(face, &marked, size, (width - 2.0 * padding_x).max(1.0));
            }
        }
    }
    row.height = max_lines as f32 * line_height + vertical_padding;
}

/// Lay a table out on pages of `area`
///
/// The heading (when `with_title` is set) sits on the first page, the header
/// row repeats on every page, and rows never split across pages.
pub fn paginate(table: &SheetTable, style: &TableStyle, area: &ContentArea, with_title: bool) -> TableLayout {
    let column_widths = compute_column_widths(table, style, area.width);

    let header = table.header.as_ref().map(|cells| {
        layout_row(
            cells,
            &column_widths,
            FontFace::Bold,
            style.header_font_size,
            style.header_line_height(),
            style.padding_y + style.header_bottom_padding,
            style.padding_x,
        )
    });
    let header_height = header.as_ref().map_or(0.0, |h| h.height);

    let title_height = if with_title { style.title_height() } else { 0.0 };
    let row_limit = (area.height - header_height - title_height).max(style.body_line_height());

    let rows: Vec<RowLayout> = table
        .rows
        .iter()
        .map(|cells| {
            let mut row = layout_row(
                cells,
                &column_widths,
                FontFace::Regular,
                style.body_font_size,
                style.body_line_height(),
                2.0 * style.padding_y,
                style.padding_x,
            );
            clip_row(&mut row, row_limit, style, &column_widths);
            row
        })
        .collect();

    let mut pages = Vec::new();
    let first_top = area.top() - title_height;
    let mut page_start = 0;
    let mut table_top = first_top;
    let mut y = first_top - header_height;

    for (index, row) in rows.iter().enumerate() {
        if y - row.height < area.bottom && index > page_start {
            pages.push(TablePage {
                rows: page_start..index,
                has_title: pages.is_empty() && with_title,
                table_top,
            });
            page_start = index;
            table_top = area.top();
            y = table_top - header_height;
        }
        y -= row.height;
    }

    pages.push(TablePage {
        rows: page_start..rows.len(),
        has_title: pages.is_empty() && with_title,
        table_top,
    });

    debug!(
        table = %table.name,
        columns = column_widths.len(),
        rows = rows.len(),
        pages = pages.len(),
        "laid out table"
    );

    TableLayout {
        column_widths,
        header,
        rows,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ContentArea {
        ContentArea {
            left: 72.0,
            bottom: 72.0,
            width: 468.0,
            height: 648.0,
        }
    }

    fn table(columns: usize, rows: usize, cell: &str) -> SheetTable {
        SheetTable {
            name: "Sheet1".to_string(),
            header: Some((0..columns).map(|c| format!("Column {}", c + 1)).collect()),
            rows: (0..rows).map(|_| vec![cell.to_string(); columns]).collect(),
        }
    }

    #[test]
    fn test_natural_widths_fit_unchanged() {
        let style = TableStyle::default();
        let t = table(3, 2, "PASS");
        let natural = natural_column_widths(&t, &style);
        let widths = compute_column_widths(&t, &style, 468.0);
        assert_eq!(widths, natural);
        assert!(widths.iter().all(|&w| w >= style.min_column_width));
    }

    #[test]
    fn test_fit_widths_caps_widest_columns() {
        let widths = fit_widths(&[40.0, 300.0, 500.0], 30.0, 400.0);
        assert_eq!(widths[0], 40.0);
        assert!((widths[1] - 180.0).abs() < 0.01);
        assert!((widths[2] - 180.0).abs() < 0.01);
        assert!((widths.iter().sum::<f32>() - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_widths_too_many_columns() {
        let widths = fit_widths(&[50.0; 20], 30.0, 400.0);
        assert!(widths.iter().all(|&w| (w - 20.0).abs() < 0.01));
    }

    #[test]
    fn test_single_page_table() {
        let style = TableStyle::default();
        let layout = paginate(&table(4, 5, "PASS"), &style, &area(), true);
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.pages[0].rows, 0..5);
        assert!(layout.pages[0].has_title);
        assert!((layout.pages[0].table_top - (720.0 - style.title_height())).abs() < 0.01);
    }

    #[test]
    fn test_long_table_spans_pages() {
        let style = TableStyle::default();
        let layout = paginate(&table(3, 200, "x"), &style, &area(), true);
        assert!(layout.page_count() > 1);

        // Every row lands on exactly one page, in order
        let mut next = 0;
        for page in &layout.pages {
            assert_eq!(page.rows.start, next);
            assert!(!page.rows.is_empty());
            next = page.rows.end;
        }
        assert_eq!(next, 200);

        assert!(layout.pages[0].has_title);
        assert!(!layout.pages[1].has_title);
        assert_eq!(layout.pages[1].table_top, 720.0);
    }

    #[test]
    fn test_rows_stay_inside_body() {
        let style = TableStyle::default();
        let area = area();
        let layout = paginate(&table(2, 150, "value"), &style, &area, true);
        let header = layout.header.as_ref().unwrap().height;
        for page in &layout.pages {
            let used: f32 = layout.rows[page.rows.clone()].iter().map(|r| r.height).sum();
            assert!(page.table_top - header - used >= area.bottom - 0.01);
        }
    }

    #[test]
    fn test_header_only_table_has_one_page() {
        let style = TableStyle::default();
        let layout = paginate(&table(3, 0, ""), &style, &area(), true);
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].rows.is_empty());
    }

    #[test]
    fn test_oversized_row_is_clipped() {
        let style = TableStyle::default();
        let huge = "word ".repeat(5000);
        let layout = paginate(&table(1, 1, &huge), &style, &area(), true);
        let row = &layout.rows[0];
        assert!(row.height <= area().height);
        assert!(row.cells[0].last().unwrap().ends_with("..."));
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn test_wrapping_increases_row_height() {
        let style = TableStyle::default();
        let long = "a fairly long sentence that will never fit in a narrow column of this table";
        let narrow = ContentArea { width: 120.0, ..area() };
        let layout = paginate(&table(2, 1, long), &style, &narrow, false);
        let single_line = style.body_font_size * style.leading + 2.0 * style.padding_y;
        assert!(layout.rows[0].height > single_line);
    }
}
