//! Post-processing of rendered PDF bytes with `lopdf`: clickable title links
//! and the document information dictionary.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::builder::PageGeometry;
use crate::canvas::{Page, Text};
use crate::layout::line_height;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Errors that can occur while annotating a rendered PDF document.
#[derive(Debug)]
pub enum AnnotationError {
    /// The PDF bytes could not be parsed or saved by `lopdf`.
    Pdf(lopdf::Error),
    /// The trailer has no usable document catalog.
    MissingCatalog,
    /// A recorded page has no counterpart in the rendered document.
    MissingPage {
        /// The (1-indexed) page number that could not be resolved.
        page_number: usize,
    },
    /// A page object is not a dictionary.
    InvalidPage {
        /// The (1-indexed) page number.
        page_number: usize,
    },
}

impl From<lopdf::Error> for AnnotationError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<std::io::Error> for AnnotationError {
    fn from(err: std::io::Error) -> Self {
        Self::Pdf(err.into())
    }
}

impl std::fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "Failed to process PDF bytes: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing"),
            Self::MissingPage { page_number } => {
                write!(f, "Rendered PDF has no page {}", page_number)
            }
            Self::InvalidPage { page_number } => {
                write!(f, "Page {} is not a dictionary", page_number)
            }
        }
    }
}

impl std::error::Error for AnnotationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::MissingCatalog | Self::MissingPage { .. } | Self::InvalidPage { .. } => None,
        }
    }
}

/// Clickable rectangle in PDF user space (points, origin bottom-left).
#[derive(Clone, Debug, PartialEq)]
pub struct LinkArea {
    /// 1-indexed page number.
    pub page_number: usize,
    pub rect: [i64; 4],
    pub uri: String,
}

/// Document information entries written into the trailer `/Info` dictionary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

fn is_web_link(target: &str) -> bool {
    target.starts_with("https://") || target.starts_with("http://")
}

fn link_rect(text: &Text, geometry: &PageGeometry) -> [i64; 4] {
    let left = geometry.margin_mm + text.at.x;
    let right = left + text.width;
    let top = geometry.height_mm - geometry.margin_mm - text.at.y;
    let bottom = top - line_height(text.size);
    [left, bottom, right, top].map(|mm| (mm * POINTS_PER_MM).round() as i64)
}

/// Collects the link areas of all texts that point at a web address.
pub fn collect_link_areas(pages: &[Page], geometry: &PageGeometry) -> Vec<LinkArea> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(index, page)| {
            page.texts().filter_map(move |text| {
                let uri = text.link.as_deref().filter(|uri| is_web_link(uri))?;
                Some(LinkArea {
                    page_number: index + 1,
                    rect: link_rect(text, geometry),
                    uri: uri.to_string(),
                })
            })
        })
        .collect()
}

fn link_annotation(area: &LinkArea) -> Dictionary {
    let mut action = Dictionary::new();
    action.set("Type", Object::Name("Action".into()));
    action.set("S", Object::Name("URI".into()));
    action.set("URI", Object::string_literal(area.uri.as_str()));

    let mut annotation = Dictionary::new();
    annotation.set("Type", Object::Name("Annot".into()));
    annotation.set("Subtype", Object::Name("Link".into()));
    annotation.set(
        "Rect",
        Object::Array(area.rect.iter().map(|v| Object::Integer(*v)).collect()),
    );
    annotation.set(
        "Border",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    annotation.set("A", Object::Dictionary(action));
    annotation
}

fn attach_links(
    document: &mut Document,
    links: &[LinkArea],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<(), AnnotationError> {
    let mut per_page: BTreeMap<usize, Vec<ObjectId>> = BTreeMap::new();
    for link in links {
        let id = document.add_object(Object::Dictionary(link_annotation(link)));
        per_page.entry(link.page_number).or_default().push(id);
    }

    for (page_number, ids) in per_page {
        let page_id = pages
            .get(&(page_number as u32))
            .copied()
            .ok_or(AnnotationError::MissingPage { page_number })?;
        let Some(Object::Dictionary(page)) = document.objects.get_mut(&page_id) else {
            return Err(AnnotationError::InvalidPage { page_number });
        };

        let mut annots = match page.get(b"Annots") {
            Ok(Object::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        annots.extend(ids.into_iter().map(Object::Reference));
        page.set("Annots", Object::Array(annots));
    }

    Ok(())
}

fn write_info(dictionary: &mut Dictionary, info: &DocumentInfo) {
    dictionary.set("Title", Object::string_literal(info.title.as_str()));
    dictionary.set("Author", Object::string_literal(info.author.as_str()));
    dictionary.set("Creator", Object::string_literal("rekap"));
    dictionary.set("Producer", Object::string_literal(""));
}

fn apply_info(document: &mut Document, info: &DocumentInfo) -> Result<(), AnnotationError> {
    if !matches!(document.trailer.get(b"Root"), Ok(Object::Reference(_))) {
        return Err(AnnotationError::MissingCatalog);
    }

    let existing = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    if let Some(Object::Dictionary(dictionary)) =
        existing.and_then(|id| document.objects.get_mut(&id))
    {
        write_info(dictionary, info);
        return Ok(());
    }

    let mut dictionary = Dictionary::new();
    write_info(&mut dictionary, info);
    let id = document.add_object(Object::Dictionary(dictionary));
    document.trailer.set("Info", Object::Reference(id));
    Ok(())
}

/// Adds link annotations and the information dictionary to `pdf_bytes`.
pub fn annotate(
    pdf_bytes: &[u8],
    links: &[LinkArea],
    info: &DocumentInfo,
) -> Result<Vec<u8>, AnnotationError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    attach_links(&mut document, links, &pages)?;
    apply_info(&mut document, info)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}
