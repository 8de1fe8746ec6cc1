//! Building the merged report
//!
//! The pipeline lays every section out before rendering anything. Section
//! page counts decide how long the summary is, the summary length decides
//! where each section starts, and those start pages are printed both on the
//! summary and in every footer.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lopdf::Document;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::layout::{content_area, Margins, Orientation, PageDimensions};
use crate::pdf::footer::FooterOptions;
use crate::pdf::merge::merge_documents;
use crate::pdf::metadata::set_document_info;
use crate::pdf::outline::{apply_links, apply_outline, OutlineNode};
use crate::pdf::section::{render_section, RenderContext, SectionSpec};
use crate::pdf::summary::{render_summary, summary_page_count, SummaryEntry, SummaryOptions};
use crate::pdf::table::{natural_column_widths, paginate, TableStyle};
use crate::sheet::{read_workbook, ReadOptions, SheetSelection, SheetTable, Workbook};

/// Producer written into the document information dictionary
const PRODUCER: &str = concat!("sheet-report ", env!("CARGO_PKG_VERSION"));

/// Options for building a report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Spreadsheet files in report order
    pub inputs: Vec<PathBuf>,
    /// Output PDF path
    pub output: PathBuf,
    pub read: ReadOptions,
    /// Paper size; the summary always uses it in portrait
    pub page: PageDimensions,
    pub orientation: Orientation,
    pub margins: Margins,
    pub table_style: TableStyle,
    /// Title of the summary page and of the document
    pub summary_title: String,
    pub footer: FooterOptions,
    /// Report date, shown on the summary and used for `[date]` in footers
    pub date: Option<NaiveDate>,
    /// When set, every section is also written here as its own PDF
    pub section_dir: Option<PathBuf>,
    /// Fail on the first unreadable workbook instead of skipping it
    pub strict: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::from("final_report.pdf"),
            read: ReadOptions::default(),
            page: PageDimensions::letter(),
            orientation: Orientation::Auto,
            margins: Margins::standard(),
            table_style: TableStyle::default(),
            summary_title: SummaryOptions::default().title,
            footer: FooterOptions::default(),
            date: None,
            section_dir: None,
            strict: false,
        }
    }
}

/// What ended up in a finished report
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub total_pages: usize,
    pub summary_pages: usize,
    pub sections: Vec<SectionSummary>,
    pub skipped: Vec<SkippedInput>,
}

/// One rendered section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub title: String,
    /// Workbook file name
    pub workbook: String,
    /// Sheet name, set when every sheet gets its own section
    pub sheet: Option<String>,
    /// 1-based page of the section's first page in the report
    pub first_page: usize,
    pub page_count: usize,
}

/// A workbook or sheet that was left out of the report
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInput {
    pub file: PathBuf,
    pub sheet: Option<String>,
    pub reason: String,
}

/// A laid-out section and where it came from
struct PlannedSection {
    workbook_index: usize,
    sheet: Option<String>,
    spec: SectionSpec,
}

/// Read, lay out, render and merge the inputs into one PDF
pub fn build_report(options: &ReportOptions) -> Result<ReportSummary> {
    let (workbooks, mut skipped) = read_inputs(options)?;

    for workbook in &workbooks {
        skipped.extend(workbook.skipped.iter().map(|sheet| SkippedInput {
            file: workbook.path.clone(),
            sheet: Some(sheet.name.clone()),
            reason: sheet.reason.clone(),
        }));
    }

    let footer = FooterOptions {
        date: options.footer.date.or(options.date),
        ..options.footer.clone()
    };

    let planned = plan_sections(&workbooks, options, &footer);
    if planned.is_empty() {
        return Err(Error::NoSections);
    }

    let summary_options = SummaryOptions {
        title: options.summary_title.clone(),
        date: options.date,
        ..Default::default()
    };
    let summary_area = content_area(&options.page, &options.margins, footer.band_height());

    // Entries only need their count here; targets are filled in below
    let entry_count = summary_entry_count(&planned, options.read.sheets);
    let summary_pages = summary_page_count(entry_count, &summary_options, &summary_area);

    let mut first_pages = Vec::with_capacity(planned.len());
    let mut next_page = summary_pages + 1;
    for section in &planned {
        first_pages.push(next_page);
        next_page += section.spec.page_count();
    }
    let total_pages = next_page - 1;

    info!(
        sections = planned.len(),
        summary_pages,
        total_pages,
        "laid out report"
    );

    let entries = summary_entries(&workbooks, &planned, &first_pages, options.read.sheets);
    let (summary_doc, links) = render_summary(
        &entries,
        &summary_options,
        &options.page,
        &summary_area,
        &footer,
        total_pages,
    )?;

    let mut documents = Vec::with_capacity(planned.len() + 1);
    documents.push(summary_doc);

    for (index, (section, &first_page)) in planned.iter().zip(&first_pages).enumerate() {
        let ctx = RenderContext {
            style: &options.table_style,
            footer: &footer,
            first_page_number: first_page,
            total_pages,
        };
        let doc = render_section(&section.spec, &ctx)?;

        if let Some(ref dir) = options.section_dir {
            write_section(dir, index, &section.spec.title, &doc)?;
        }
        documents.push(doc);
    }

    let merged = merge_documents(documents)?;
    let mut report = merged.document;

    // page_starts[0] is the summary; sections follow in order
    let section_starts = &merged.page_starts[1..];
    let outline = outline_nodes(&workbooks, &planned, section_starts, options.read.sheets);

    apply_outline(&mut report, &outline)?;
    apply_links(&mut report, &links)?;
    set_document_info(&mut report, &options.summary_title, PRODUCER)?;

    report.compress();
    report.save(&options.output)?;

    info!(output = %options.output.display(), pages = merged.page_count, "wrote report");

    let sections = planned
        .iter()
        .zip(&first_pages)
        .map(|(section, &first_page)| SectionSummary {
            title: section.spec.title.clone(),
            workbook: workbooks[section.workbook_index].name.clone(),
            sheet: section.sheet.clone(),
            first_page,
            page_count: section.spec.page_count(),
        })
        .collect();

    Ok(ReportSummary {
        output: options.output.clone(),
        total_pages: merged.page_count,
        summary_pages,
        sections,
        skipped,
    })
}

fn read_inputs(options: &ReportOptions) -> Result<(Vec<Workbook>, Vec<SkippedInput>)> {
    let mut workbooks = Vec::with_capacity(options.inputs.len());
    let mut skipped = Vec::new();

    for path in &options.inputs {
        info!(file = %path.display(), "reading workbook");
        match read_workbook(path, &options.read) {
            Ok(workbook) => workbooks.push(workbook),
            Err(e) if !options.strict => {
                warn!(file = %path.display(), error = %e, "skipping workbook");
                skipped.push(SkippedInput {
                    file: path.clone(),
                    sheet: None,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok((workbooks, skipped))
}

/// Lay out one section per sheet, or per workbook in first-sheet mode
fn plan_sections(workbooks: &[Workbook], options: &ReportOptions, footer: &FooterOptions) -> Vec<PlannedSection> {
    let mut planned = Vec::new();

    for (workbook_index, workbook) in workbooks.iter().enumerate() {
        for table in &workbook.sheets {
            let title = section_title(workbook, table, options.read.sheets);
            let page = section_page(table, options, footer);
            let area = content_area(&page, &options.margins, footer.band_height());
            let layout = paginate(table, &options.table_style, &area, true);

            debug!(
                section = %title,
                pages = layout.page_count(),
                landscape = page.width.mm() > page.height.mm(),
                "planned section"
            );

            let sheet = match options.read.sheets {
                SheetSelection::All => Some(table.name.clone()),
                SheetSelection::First => None,
            };
            planned.push(PlannedSection {
                workbook_index,
                sheet,
                spec: SectionSpec { title, page, area, layout },
            });
        }
    }

    planned
}

fn section_title(workbook: &Workbook, table: &SheetTable, selection: SheetSelection) -> String {
    match selection {
        SheetSelection::First => workbook.name.clone(),
        SheetSelection::All => format!("{} - {}", workbook.name, table.name),
    }
}

/// Page size for a section after resolving the orientation
fn section_page(table: &SheetTable, options: &ReportOptions, footer: &FooterOptions) -> PageDimensions {
    match options.orientation {
        Orientation::Portrait => options.page,
        Orientation::Landscape => options.page.landscape(),
        Orientation::Auto => {
            let portrait = content_area(&options.page, &options.margins, footer.band_height());
            let natural: f32 = natural_column_widths(table, &options.table_style).iter().sum();
            if natural > portrait.width {
                options.page.landscape()
            } else {
                options.page
            }
        }
    }
}

fn summary_entry_count(planned: &[PlannedSection], selection: SheetSelection) -> usize {
    let workbooks = group_by_workbook(planned).len();
    match selection {
        SheetSelection::First => workbooks,
        SheetSelection::All => workbooks + planned.len(),
    }
}

/// Consecutive runs of sections belonging to the same workbook
fn group_by_workbook(planned: &[PlannedSection]) -> Vec<std::ops::Range<usize>> {
    let mut groups: Vec<std::ops::Range<usize>> = Vec::new();
    for (i, section) in planned.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if planned[group.start].workbook_index == section.workbook_index => {
                group.end = i + 1;
            }
            _ => groups.push(i..i + 1),
        }
    }
    groups
}

fn summary_entries(
    workbooks: &[Workbook],
    planned: &[PlannedSection],
    first_pages: &[usize],
    selection: SheetSelection,
) -> Vec<SummaryEntry> {
    let mut entries = Vec::new();

    for (number, group) in group_by_workbook(planned).into_iter().enumerate() {
        let workbook = &workbooks[planned[group.start].workbook_index];
        entries.push(SummaryEntry {
            label: format!("{}. {}", number + 1, workbook.name),
            depth: 0,
            target_page: first_pages[group.start],
        });

        if selection == SheetSelection::All {
            for i in group {
                entries.push(SummaryEntry {
                    label: planned[i].sheet.clone().unwrap_or_default(),
                    depth: 1,
                    target_page: first_pages[i],
                });
            }
        }
    }

    entries
}

/// Bookmarks: workbook → sheets, or one flat entry per workbook
fn outline_nodes(
    workbooks: &[Workbook],
    planned: &[PlannedSection],
    section_starts: &[usize],
    selection: SheetSelection,
) -> Vec<OutlineNode> {
    group_by_workbook(planned)
        .into_iter()
        .map(|group| {
            let workbook = &workbooks[planned[group.start].workbook_index];
            let children = match selection {
                SheetSelection::First => Vec::new(),
                SheetSelection::All => group
                    .clone()
                    .map(|i| OutlineNode::leaf(planned[i].sheet.clone().unwrap_or_default(), section_starts[i]))
                    .collect(),
            };
            OutlineNode {
                title: workbook.name.clone(),
                page_index: section_starts[group.start],
                children,
            }
        })
        .collect()
}

fn write_section(dir: &Path, index: usize, title: &str, doc: &Document) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(section_file_name(index, title));

    let mut copy = doc.clone();
    copy.compress();
    copy.save(&path)?;

    debug!(path = %path.display(), "wrote section");
    Ok(())
}

/// File name for the section at 0-based `index`
///
/// The report position prefix keeps names unique when titles repeat, e.g.
/// two `test.xlsx` inputs from different directories.
fn section_file_name(index: usize, title: &str) -> String {
    format!("{:02}_{}.pdf", index + 1, file_stem_for(title))
}

fn file_stem_for(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "section".to_string()
    } else {
        stem.to_string()
    }
}
