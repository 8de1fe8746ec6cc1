//! Building lopdf documents from rendered page content

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::{Error, Result};
use crate::layout::PageDimensions;
use crate::pdf::font::font_resources;

/// Create a document with one page per content stream
///
/// All pages share one resource dictionary holding Helvetica (`/F1`) and
/// Helvetica-Bold (`/F2`).
pub fn build_document(page: &PageDimensions, contents: Vec<String>) -> Result<Document> {
    if contents.is_empty() {
        return Err(Error::General("Cannot build a document without pages".to_string()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let resources = font_resources(&mut doc);
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let media_box = Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(page.width_pt()),
        Object::Real(page.height_pt()),
    ]);

    let mut kids = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("MediaBox", media_box.clone());
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Reference(resources_id));

        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page_dict))));
    }

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(kids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));

    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}

/// Page object ids in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Encode a PDF text string (titles, bookmarks, document info)
///
/// ASCII stays a literal string; anything else is written as UTF-16BE with
/// a byte order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string written as UTF-16BE (with BOM) or PDFDocEncoding
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_document_page_count() {
        let doc = build_document(
            &PageDimensions::letter(),
            vec!["BT ET".to_string(), "BT ET".to_string(), "BT ET".to_string()],
        )
        .unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert_eq!(page_ids(&doc).len(), 3);
    }

    #[test]
    fn test_build_document_rejects_no_pages() {
        let result = build_document(&PageDimensions::letter(), Vec::new());
        assert!(matches!(result, Err(Error::General(_))));
    }

    #[test]
    fn test_text_string_round_trip() {
        for title in ["Login.xlsx", "Résultats", "テスト"] {
            let object = text_string(title);
            let bytes = object.as_str().unwrap();
            assert_eq!(decode_text_string(bytes), title);
        }
    }

    #[test]
    fn test_text_string_ascii_is_literal() {
        assert!(matches!(text_string("Sheet1"), Object::String(_, StringFormat::Literal)));
    }
}
