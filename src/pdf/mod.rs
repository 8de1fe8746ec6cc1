//! PDF generation module

pub mod document;
pub mod font;
pub mod footer;
pub mod merge;
pub mod metadata;
pub mod outline;
pub mod section;
pub mod summary;
pub mod table;

// Re-export commonly used items
pub use footer::FooterOptions;
pub use merge::{merge_documents, merge_pdfs, MergeOptions, MergedDocument};
pub use metadata::{count_pages, extract_metadata, read_outline, OutlineEntry, PdfMetadata};
pub use outline::{apply_links, apply_outline, OutlineNode};
pub use section::{render_section, RenderContext, SectionSpec};
pub use summary::{render_summary, summary_page_count, SummaryEntry, SummaryOptions};
pub use table::{paginate, TableLayout, TableStyle};
