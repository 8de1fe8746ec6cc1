//! Bookmark outline and summary links, built on top of `lopdf`

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::pdf::document::{page_ids, text_string};
use crate::pdf::summary::LinkTarget;

/// One bookmark and the bookmarks nested under it
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub title: String,
    /// 0-based index of the destination page in the final document
    pub page_index: usize,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn leaf(title: impl Into<String>, page_index: usize) -> Self {
        Self {
            title: title.into(),
            page_index,
            children: Vec::new(),
        }
    }
}

/// Write an `/Outlines` tree mirroring `nodes` into the document
///
/// Top-level entries are open; nested entries start closed. The catalog is
/// set to open with the bookmark pane showing.
pub fn apply_outline(doc: &mut Document, nodes: &[OutlineNode]) -> Result<()> {
    if nodes.is_empty() {
        return Ok(());
    }

    let pages = page_ids(doc);
    let outlines_id = doc.new_object_id();
    let (first, last) = write_level(doc, nodes, outlines_id, &pages)?;

    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => first,
            "Last" => last,
            "Count" => nodes.len() as i64,
        }),
    );

    let catalog = catalog_mut(doc)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    Ok(())
}

/// Write one level of siblings; returns the first and last item ids
fn write_level(
    doc: &mut Document,
    nodes: &[OutlineNode],
    parent_id: ObjectId,
    pages: &[ObjectId],
) -> Result<(ObjectId, ObjectId)> {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

    for (i, node) in nodes.iter().enumerate() {
        let page_ref = destination_page(pages, node.page_index)?;

        let mut item = dictionary! {
            "Title" => text_string(&node.title),
            "Parent" => parent_id,
            "Dest" => vec![Object::Reference(page_ref), Object::Name(b"Fit".to_vec())],
        };
        if i > 0 {
            item.set("Prev", Object::Reference(ids[i - 1]));
        }
        if i + 1 < ids.len() {
            item.set("Next", Object::Reference(ids[i + 1]));
        }
        if !node.children.is_empty() {
            let (first, last) = write_level(doc, &node.children, ids[i], pages)?;
            item.set("First", Object::Reference(first));
            item.set("Last", Object::Reference(last));
            item.set("Count", Object::Integer(-(node.children.len() as i64)));
        }

        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    Ok((ids[0], ids[ids.len() - 1]))
}

/// Add borderless link annotations jumping from summary entries to sections
///
/// `summary_page` indices are 0-based pages of the merged document; the
/// summary comes first, so they coincide with summary page indices.
pub fn apply_links(doc: &mut Document, links: &[LinkTarget]) -> Result<()> {
    let pages = page_ids(doc);

    for link in links {
        let source = destination_page(&pages, link.summary_page)?;
        let target = destination_page(&pages, link.target_page.saturating_sub(1))?;

        let annotation = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => link.rect.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
            "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            "A" => dictionary! {
                "S" => "GoTo",
                "D" => vec![Object::Reference(target), Object::Name(b"Fit".to_vec())],
            },
        };
        let annotation_id = doc.add_object(Object::Dictionary(annotation));

        let page = doc.get_object_mut(source)?.as_dict_mut()?;
        let mut annots = match page.get(b"Annots") {
            Ok(Object::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        annots.push(Object::Reference(annotation_id));
        page.set("Annots", Object::Array(annots));
    }

    Ok(())
}

fn destination_page(pages: &[ObjectId], index: usize) -> Result<ObjectId> {
    pages.get(index).copied().ok_or(Error::MissingPage {
        page: index + 1,
        page_count: pages.len(),
    })
}

fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;

    doc.get_object_mut(catalog_id)?
        .as_dict_mut()
        .map_err(|_| Error::General("Catalog is not a dictionary".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageDimensions;
    use crate::pdf::document::build_document;
    use crate::pdf::metadata::read_outline;

    fn five_pages() -> Document {
        build_document(&PageDimensions::letter(), vec!["BT ET".to_string(); 5]).unwrap()
    }

    #[test]
    fn test_apply_nested_outline() {
        let mut doc = five_pages();
        let nodes = vec![
            OutlineNode {
                title: "smoke.xlsx".to_string(),
                page_index: 1,
                children: vec![OutlineNode::leaf("Login", 1), OutlineNode::leaf("Checkout", 2)],
            },
            OutlineNode::leaf("regression.xlsx", 4),
        ];

        apply_outline(&mut doc, &nodes).unwrap();

        let entries = read_outline(&doc);
        let titles: Vec<(&str, usize, Option<usize>)> = entries
            .iter()
            .map(|e| (e.title.as_str(), e.depth, e.page_number))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("smoke.xlsx", 0, Some(2)),
                ("Login", 1, Some(2)),
                ("Checkout", 1, Some(3)),
                ("regression.xlsx", 0, Some(5)),
            ]
        );

        let catalog = doc.catalog().unwrap();
        assert_eq!(catalog.get(b"PageMode").unwrap().as_name().unwrap(), b"UseOutlines");
    }

    #[test]
    fn test_outline_missing_page() {
        let mut doc = five_pages();
        let result = apply_outline(&mut doc, &[OutlineNode::leaf("Beyond", 9)]);
        assert!(matches!(result, Err(Error::MissingPage { page: 10, page_count: 5 })));
    }

    #[test]
    fn test_empty_outline_is_noop() {
        let mut doc = five_pages();
        apply_outline(&mut doc, &[]).unwrap();
        assert!(doc.catalog().unwrap().get(b"Outlines").is_err());
    }

    #[test]
    fn test_apply_links_adds_annotations() {
        let mut doc = five_pages();
        let links = vec![
            LinkTarget {
                summary_page: 0,
                rect: [72.0, 600.0, 540.0, 612.0],
                target_page: 2,
            },
            LinkTarget {
                summary_page: 0,
                rect: [72.0, 580.0, 540.0, 592.0],
                target_page: 5,
            },
        ];

        apply_links(&mut doc, &links).unwrap();

        let pages = page_ids(&doc);
        let first = doc.get_dictionary(pages[0]).unwrap();
        let annots = first.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 2);

        let annot = doc.get_dictionary(annots[1].as_reference().unwrap()).unwrap();
        let action = annot.get(b"A").unwrap().as_dict().unwrap();
        let dest = action.get(b"D").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), pages[4]);
    }
}
