use crate::config::REFERENCE_ID_PATTERN;
use crate::error::{ExtractError, Result};
use crate::fields;
use crate::models::{ExtractedDocument, MainPaper, PaperRecord, Reference};
use crate::parser::{Element, TeiDocument};
use crate::query;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

static REFERENCE_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(REFERENCE_ID_PATTERN).unwrap());

/// GROBID numbers bibliography entries `b0`, `b1`, ...; other `biblStruct`s
/// (the header's own description, funding entries) use different ids or none.
pub fn is_reference_id(id: &str) -> bool {
    REFERENCE_ID_REGEX.is_match(id)
}

pub fn extract_document(xml: &str) -> Result<ExtractedDocument> {
    let doc = TeiDocument::parse(xml)?;
    Ok(assemble(&doc))
}

pub fn extract_bytes(bytes: &[u8]) -> Result<ExtractedDocument> {
    let doc = TeiDocument::from_bytes(bytes)?;
    Ok(assemble(&doc))
}

pub fn extract_file(path: impl AsRef<Path>) -> Result<ExtractedDocument> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Loaded TEI document");
    extract_bytes(&bytes)
}

pub fn assemble(doc: &TeiDocument) -> ExtractedDocument {
    let header = query::find_header(doc.root());
    let main_paper = main_paper(header);

    let mut references = Vec::new();
    let mut rejected = 0usize;
    for entry in query::bibl_structs(doc.root()) {
        match entry.attr("id").filter(|id| is_reference_id(id)) {
            Some(id) => references.push(reference(entry, id)),
            None => {
                rejected += 1;
                trace!(id = entry.attr("id").unwrap_or(""), "Skipping non-reference biblStruct");
            }
        }
    }

    debug!(
        references = references.len(),
        rejected,
        authors = main_paper.paper.authors.len(),
        "Assembled document"
    );

    ExtractedDocument {
        main_paper,
        references,
    }
}

fn main_paper(header: &Element) -> MainPaper {
    MainPaper {
        paper: PaperRecord {
            title: fields::main_title(header),
            authors: fields::main_authors(header),
            year: fields::published_year(header),
            doi: fields::doi(header),
            arxiv_id: fields::arxiv_id(header),
        },
        abstract_text: fields::abstract_text(header),
    }
}

fn reference(entry: &Element, source_id: &str) -> Reference {
    Reference {
        source_id: source_id.to_string(),
        paper: PaperRecord {
            title: fields::reference_title(entry),
            authors: fields::reference_authors(entry),
            year: fields::published_year(entry),
            doi: fields::doi(entry),
            arxiv_id: fields::arxiv_id(entry),
        },
        venue: fields::venue(entry),
        pages: fields::pages(entry),
        volume: fields::volume(entry),
        enrichment: None,
    }
}
