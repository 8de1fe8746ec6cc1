//! Sheet Report CLI tool
//!
//! A command-line tool for turning spreadsheets into one navigable PDF report.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use sheet_report::date::parse_report_date;
use sheet_report::layout::{Orientation, PageDimensions};
use sheet_report::pdf::{extract_metadata, merge_pdfs, FooterOptions, MergeOptions};
use sheet_report::report::{build_report, ReportOptions};
use sheet_report::sheet::{read_workbook, ReadOptions, SheetSelection};
use sheet_report::Error;

/// Sheet Report - Turn spreadsheets into a bookmarked PDF report
#[derive(Parser)]
#[command(name = "sheet-report")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build a report from every workbook in the current directory
    sheet-report build -o final_report.pdf *.xlsx

    # One section per file, using only the first sheet
    sheet-report build -o report.pdf --first-sheet-only test.xlsx test1.xlsx

    # Dated report with a footer note
    sheet-report build -o report.pdf --date today --footer-left \"Nightly run [date]\" results/*.xlsx

    # List the sheets that would become sections
    sheet-report sheets *.xlsx")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a PDF report from spreadsheet files
    Build(BuildArgs),

    /// List the sheets of spreadsheet files
    Sheets {
        /// Input spreadsheet files. Supports glob patterns like "*.xlsx"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Only read the first sheet of each file
        #[arg(long)]
        first_sheet_only: bool,
    },

    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Input spreadsheet files (in order). Supports glob patterns like "*.xlsx"
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, default_value = "final_report.pdf")]
    output: PathBuf,

    /// One section per file from its first sheet, instead of one per sheet
    #[arg(long)]
    first_sheet_only: bool,

    /// Treat the first row as data rather than a column header
    #[arg(long)]
    no_header: bool,

    /// Summary page title
    #[arg(long, default_value = "Test Automation Summary")]
    title: String,

    /// Report date (e.g., "today", "2026-01-14", "01/14/2026")
    #[arg(long)]
    date: Option<String>,

    /// Paper size
    #[arg(long, value_enum, default_value_t = Paper::Letter)]
    paper: Paper,

    /// Orientation of table pages
    #[arg(long, value_enum, default_value_t = OrientationArg::Auto)]
    orientation: OrientationArg,

    /// Footer left section ([page], [pages] and [date] are replaced)
    #[arg(long)]
    footer_left: Option<String>,

    /// Footer center section ([page], [pages] and [date] are replaced)
    #[arg(long)]
    footer_center: Option<String>,

    /// Leave out "Page N of M" in the footer
    #[arg(long)]
    no_page_numbers: bool,

    /// Also write every section as its own PDF into this directory
    #[arg(long)]
    sections_dir: Option<PathBuf>,

    /// Fail on the first unreadable file instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Open the output file after creation
    #[arg(long)]
    open: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Paper {
    Letter,
    A4,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
    Auto,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
            OrientationArg::Auto => Orientation::Auto,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => cmd_build(args),
        Commands::Sheets { inputs, first_sheet_only } => {
            cmd_sheets(inputs, first_sheet_only)
        }
        Commands::Merge { inputs, output, open } => {
            cmd_merge(inputs, output, open)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr; RUST_LOG overrides the verbosity flag
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Expand glob patterns in input paths
///
/// Arguments keep the order they were given in; only the matches of a single
/// pattern are sorted.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matches = Vec::new();
            let entries = glob(&pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;
            for entry in entries {
                match entry {
                    Ok(path) => matches.push(path),
                    Err(e) => tracing::warn!(%pattern, error = %e, "glob error"),
                }
            }
            if matches.is_empty() {
                return Err(Error::NoFilesMatched(pattern).into());
            }
            // Sort matches for consistent ordering
            matches.sort();
            paths.extend(matches);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Build a report from spreadsheets
fn cmd_build(args: BuildArgs) -> Result<()> {
    let inputs = expand_globs(args.inputs)?;

    let date = match args.date.as_deref() {
        Some(expr) => parse_report_date(expr)?,
        None => None,
    };

    let page = match args.paper {
        Paper::Letter => PageDimensions::letter(),
        Paper::A4 => PageDimensions::a4(),
    };

    let options = ReportOptions {
        inputs,
        output: args.output,
        read: ReadOptions {
            header_row: !args.no_header,
            sheets: if args.first_sheet_only {
                SheetSelection::First
            } else {
                SheetSelection::All
            },
        },
        page,
        orientation: args.orientation.into(),
        summary_title: args.title,
        footer: FooterOptions {
            left: args.footer_left,
            center: args.footer_center,
            show_page_numbers: !args.no_page_numbers,
            ..Default::default()
        },
        date,
        section_dir: args.sections_dir,
        strict: args.strict,
        ..Default::default()
    };

    eprintln!("Building report from {} file(s)...", options.inputs.len());

    let summary = build_report(&options)
        .with_context(|| format!("failed to build {}", options.output.display()))?;

    for skipped in &summary.skipped {
        match skipped.sheet {
            Some(ref sheet) => eprintln!("Skipped {} [{}]: {}", skipped.file.display(), sheet, skipped.reason),
            None => eprintln!("Skipped {}: {}", skipped.file.display(), skipped.reason),
        }
    }

    eprintln!(
        "{} section(s), {} page(s) including {} summary page(s)",
        summary.sections.len(),
        summary.total_pages,
        summary.summary_pages
    );
    println!("Final report generated with working bookmarks: {}", summary.output.display());

    if args.open {
        open_file(&summary.output)?;
    }

    Ok(())
}

/// List sheets and their sizes
fn cmd_sheets(inputs: Vec<String>, first_sheet_only: bool) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    let options = ReadOptions {
        sheets: if first_sheet_only {
            SheetSelection::First
        } else {
            SheetSelection::All
        },
        ..Default::default()
    };

    for path in &inputs {
        let workbook = read_workbook(path, &options)
            .with_context(|| format!("failed to read {}", path.display()))?;

        println!("{}", workbook.name);
        for sheet in &workbook.sheets {
            println!(
                "  {}: {} rows x {} columns",
                sheet.name,
                sheet.row_count(),
                sheet.column_count()
            );
        }
        for skipped in &workbook.skipped {
            println!("  {}: skipped ({})", skipped.name, skipped.reason);
        }
    }

    Ok(())
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, output: PathBuf, open: bool) -> Result<()> {
    // Expand glob patterns
    let inputs = expand_globs(inputs)?;

    // Validate inputs exist
    for path in &inputs {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }
    }

    eprintln!("Merging {} PDF files...", inputs.len());

    let options = MergeOptions {
        input_paths: inputs,
        output_path: output.clone(),
    };

    let pages = merge_pdfs(&options).context("failed to merge PDFs")?;

    eprintln!("Merged {} pages to: {}", pages, output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }

    if !metadata.outline.is_empty() {
        println!("Outline:");
        for entry in &metadata.outline {
            let page = entry.page_number.map_or_else(|| "?".to_string(), |p| p.to_string());
            println!("{}{} (page {})", "  ".repeat(entry.depth + 1), entry.title, page);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_literal_inputs_keep_argument_order() {
        let paths = expand_globs(vec!["test1.xlsx".to_string(), "test.xlsx".to_string()]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("test1.xlsx"), PathBuf::from("test.xlsx")]);
    }

    #[test]
    fn test_glob_matches_are_sorted_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for name in ["b.xlsx", "a.xlsx", "c.xlsx"] {
            std::fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        let pattern = temp_dir.path().join("*.xlsx").display().to_string();

        let paths = expand_globs(vec!["z_first.xlsx".to_string(), pattern, "0_last.xlsx".to_string()]).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["z_first.xlsx", "a.xlsx", "b.xlsx", "c.xlsx", "0_last.xlsx"]);
    }

    #[test]
    fn test_unmatched_glob_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pattern = temp_dir.path().join("*.xlsx").display().to_string();
        assert!(expand_globs(vec![pattern]).is_err());
    }
}
