//! Sheet Report Library
//!
//! Turns spreadsheets into a single navigable PDF report.
//! This library provides functionality to:
//! - Read every sheet of xlsx/xls/ods workbooks into plain text tables
//! - Lay tables out as styled, paginated PDF sections
//! - Generate a summary page that links to every section
//! - Merge the summary and sections and add a bookmark outline
//! - Inspect page counts and outlines of existing PDFs
//!
//! # Example
//!
//! ```no_run
//! use sheet_report::report::{build_report, ReportOptions};
//! use std::path::PathBuf;
//!
//! let options = ReportOptions {
//!     inputs: vec![PathBuf::from("test.xlsx"), PathBuf::from("test1.xlsx")],
//!     output: PathBuf::from("final_report.pdf"),
//!     ..Default::default()
//! };
//!
//! let summary = build_report(&options).expect("Failed to build report");
//! println!("{} pages", summary.total_pages);
//! ```

pub mod date;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod report;
pub mod sheet;

// Re-export commonly used items
pub use error::{Error, Result};
