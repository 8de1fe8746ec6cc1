//! PDF metadata extraction

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::pdf::document::{decode_text_string, text_string};

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()
        .map_err(|_| Error::General("No catalog in document".to_string()))?;

    let pages_id = catalog.get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Pages in catalog".to_string()))?;

    let pages_dict = doc.get_dictionary(pages_id)?;

    match pages_dict.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::General("Count is not a page count".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
    /// Bookmarks in document order
    pub outline: Vec<OutlineEntry>,
}

/// One bookmark read back from a document
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub title: String,
    /// Nesting level, 0 for top-level bookmarks
    pub depth: usize,
    /// 1-based destination page, if it resolves to a page of this document
    pub page_number: Option<usize>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;

    // Use catalog-based counting for accuracy
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.display().to_string()));
    }

    let info = doc.trailer.get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok();

    Ok(PdfMetadata {
        page_count,
        title: info.and_then(|dict| info_string(dict, b"Title")),
        author: info.and_then(|dict| info_string(dict, b"Author")),
        producer: info.and_then(|dict| info_string(dict, b"Producer")),
        outline: read_outline(&doc),
    })
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    info.get(key)
        .and_then(Object::as_str)
        .ok()
        .map(decode_text_string)
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.display().to_string()));
    }

    Ok(page_count)
}

/// Set the document information dictionary
///
/// Replaces any existing `/Info`. The creation date is written in PDF date
/// format from the local clock.
pub fn set_document_info(doc: &mut Document, title: &str, producer: &str) -> Result<()> {
    let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();

    let mut info = Dictionary::new();
    info.set("Title", text_string(title));
    info.set("Producer", text_string(producer));
    info.set("Creator", text_string(producer));
    info.set("CreationDate", Object::string_literal(created));

    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));
    Ok(())
}

/// Read the bookmark tree of a document, depth first
///
/// Returns an empty list when the document has no outline. Destinations are
/// taken from `/Dest` or a GoTo action's `/D`; named destinations are not
/// resolved and give `page_number: None`.
pub fn read_outline(doc: &Document) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();

    let first = doc.catalog()
        .and_then(|catalog| catalog.get(b"Outlines"))
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .and_then(|outlines| outlines.get(b"First"))
        .and_then(Object::as_reference);

    if let Ok(first) = first {
        let page_numbers: BTreeMap<ObjectId, usize> = doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number as usize))
            .collect();
        let mut visited = HashSet::new();
        read_level(doc, first, 0, &page_numbers, &mut visited, &mut entries);
    }

    entries
}

fn read_level(
    doc: &Document,
    first: ObjectId,
    depth: usize,
    page_numbers: &BTreeMap<ObjectId, usize>,
    visited: &mut HashSet<ObjectId>,
    entries: &mut Vec<OutlineEntry>,
) {
    let mut current = Some(first);

    while let Some(id) = current {
        // A malformed outline may link back on itself
        if !visited.insert(id) {
            break;
        }
        let Ok(item) = doc.get_dictionary(id) else {
            break;
        };

        let title = item.get(b"Title")
            .and_then(Object::as_str)
            .map(decode_text_string)
            .unwrap_or_default();

        entries.push(OutlineEntry {
            title,
            depth,
            page_number: destination_page(item).and_then(|page| page_numbers.get(&page).copied()),
        });

        if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
            read_level(doc, child, depth + 1, page_numbers, visited, entries);
        }

        current = item.get(b"Next").and_then(Object::as_reference).ok();
    }
}

fn destination_page(item: &Dictionary) -> Option<ObjectId> {
    let dest = match item.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => item.get(b"A")
            .and_then(Object::as_dict)
            .and_then(|action| action.get(b"D"))
            .ok()?,
    };

    dest.as_array()
        .ok()?
        .first()?
        .as_reference()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageDimensions;
    use crate::pdf::document::build_document;
    use lopdf::dictionary;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_count_pages_from_catalog() {
        let doc = build_document(&PageDimensions::letter(), vec!["BT ET".to_string(); 4]).unwrap();
        assert_eq!(count_pages_from_catalog(&doc).unwrap(), 4);
    }

    #[test]
    fn test_read_outline_without_outlines() {
        let doc = build_document(&PageDimensions::letter(), vec!["BT ET".to_string()]).unwrap();
        assert!(read_outline(&doc).is_empty());
    }

    #[test]
    fn test_read_outline_goto_action() {
        let mut doc = build_document(&PageDimensions::letter(), vec!["BT ET".to_string(); 2]).unwrap();
        let second_page = *doc.get_pages().get(&2).unwrap();

        let outlines_id = doc.new_object_id();
        let item_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Results"),
            "Parent" => outlines_id,
            "A" => dictionary! {
                "S" => "GoTo",
                "D" => vec![Object::Reference(second_page), Object::Name(b"Fit".to_vec())],
            },
        });
        doc.objects.insert(outlines_id, Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => item_id,
            "Last" => item_id,
            "Count" => 1,
        }));
        let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference).unwrap();
        doc.get_dictionary_mut(catalog_id).unwrap().set("Outlines", outlines_id);

        assert_eq!(
            read_outline(&doc),
            vec![OutlineEntry {
                title: "Results".to_string(),
                depth: 0,
                page_number: Some(2),
            }]
        );
    }

    #[test]
    fn test_set_document_info() {
        let mut doc = build_document(&PageDimensions::letter(), vec!["BT ET".to_string()]).unwrap();
        set_document_info(&mut doc, "Test Automation Summary", "sheet-report").unwrap();

        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info_string(info, b"Title").as_deref(), Some("Test Automation Summary"));
        assert_eq!(info_string(info, b"Producer").as_deref(), Some("sheet-report"));
        assert!(info.has(b"CreationDate"));
    }
}
