//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::PathBuf;
use lopdf::{Document, Object, ObjectId, Dictionary};
use tracing::debug;
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// A merged document and where each input starts in it
#[derive(Debug)]
pub struct MergedDocument {
    pub document: Document,
    /// 0-based index of each input's first page
    pub page_starts: Vec<usize>,
    pub page_count: usize,
}

/// Merge multiple PDF files into a single PDF
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use sheet_report::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("summary.pdf"),
///         PathBuf::from("test.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    // Validate all input files exist
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut documents = Vec::with_capacity(options.input_paths.len());
    for path in &options.input_paths {
        let doc = Document::load(path)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.display().to_string()));
        }
        documents.push(doc);
    }

    let mut merged = merge_documents(documents)?;

    merged.document.compress();
    merged.document.save(&options.output_path)?;

    Ok(merged.page_count)
}

/// Merge in-memory documents, in order, into one document
///
/// Objects of every input are renumbered so they cannot collide, then a
/// fresh Catalog and Pages tree is built over all collected pages. Old
/// catalogs and page tree nodes are dropped.
pub fn merge_documents(documents: Vec<Document>) -> Result<MergedDocument> {
    if documents.is_empty() {
        return Err(Error::General("No input documents provided".to_string()));
    }

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut page_starts = Vec::with_capacity(documents.len());
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (index, mut doc) in documents.into_iter().enumerate() {
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(format!("input document {}", index + 1)));
        }

        flatten_inherited_attributes(&mut doc);

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_starts.push(page_ids.len());
        page_ids.extend(doc.get_pages().into_values());

        objects.extend(doc.objects.into_iter().filter(|(_, object)| !is_tree_node(object)));
    }

    let mut merged_doc = Document::with_version("1.5");

    // Add all collected objects FIRST
    merged_doc.objects.extend(objects);

    // max_id must cover the objects just added, or new_object_id() collides
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    // Update parent references for all pages
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    debug!(inputs = page_starts.len(), pages = page_ids.len(), "merged documents");

    Ok(MergedDocument {
        document: merged_doc,
        page_starts,
        page_count: page_ids.len(),
    })
}

/// Copy attributes inherited through the page tree onto each page
///
/// The merged document gets a new single-level page tree, so anything a
/// page used to inherit from an intermediate Pages node would be lost.
fn flatten_inherited_attributes(doc: &mut Document) {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in pages {
        let mut inherited: Vec<(&[u8], Object)> = Vec::new();

        if let Ok(page) = doc.get_dictionary(page_id) {
            for key in INHERITABLE {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = inherited_value(doc, page, key) {
                    inherited.push((key, value));
                }
            }
        }

        if inherited.is_empty() {
            continue;
        }
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
    }
}

fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent_ref = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Page trees are shallow; the bound guards against malformed cycles
    for _ in 0..64 {
        let parent = doc.get_dictionary(parent_ref?).ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        parent_ref = parent.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn is_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Catalog") | Ok(b"Pages")
        ),
        _ => false,
    }
}
