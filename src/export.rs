//! JSON export in the `parsed_references.json` layout.
//!
//! This is the presentation boundary: missing titles become the "Unknown" /
//! "No title" sentinels here, persons gain `full_name`, and the reserved
//! resolver fields (`paper_id`, `citation_count`, `full_abstract`) are always
//! present, null unless an [`Enrichment`] was attached.

use crate::config::{MAIN_TITLE_SENTINEL, REFERENCE_TITLE_SENTINEL};
use crate::models::{Enrichment, ExtractedDocument, MainPaper, Person, Reference};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPerson {
    pub forename: String,
    pub surname: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMainPaper {
    pub title: String,
    pub authors: Vec<ExportedPerson>,
    pub year: Option<String>,
    pub arxiv: Option<String>,
    pub doi: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedReference {
    pub title: String,
    pub authors: Vec<ExportedPerson>,
    pub year: Option<String>,
    pub doi: Option<String>,
    pub arxiv: Option<String>,
    pub venue: Option<String>,
    pub pages: Option<String>,
    pub volume: Option<String>,
    pub grobid_id: String,
    pub paper_id: Option<String>,
    pub citation_count: Option<u64>,
    pub full_abstract: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub main_paper: ExportedMainPaper,
    pub references: Vec<ExportedReference>,
}

impl From<&Person> for ExportedPerson {
    fn from(person: &Person) -> Self {
        Self {
            forename: person.forename.clone(),
            surname: person.surname.clone(),
            full_name: person.full_name(),
        }
    }
}

impl From<&MainPaper> for ExportedMainPaper {
    fn from(main: &MainPaper) -> Self {
        let paper = &main.paper;
        Self {
            title: paper
                .title
                .clone()
                .unwrap_or_else(|| MAIN_TITLE_SENTINEL.to_string()),
            authors: paper.authors.iter().map(ExportedPerson::from).collect(),
            year: paper.year.clone(),
            arxiv: paper.arxiv_id.clone(),
            doi: paper.doi.clone(),
            abstract_text: main.abstract_text.clone(),
        }
    }
}

impl From<&Reference> for ExportedReference {
    fn from(reference: &Reference) -> Self {
        let paper = &reference.paper;
        let enrichment = reference.enrichment.clone().unwrap_or_default();
        let Enrichment {
            external_paper_id,
            citation_count,
            full_abstract,
        } = enrichment;

        Self {
            title: paper
                .title
                .clone()
                .unwrap_or_else(|| REFERENCE_TITLE_SENTINEL.to_string()),
            authors: paper.authors.iter().map(ExportedPerson::from).collect(),
            year: paper.year.clone(),
            doi: paper.doi.clone(),
            arxiv: paper.arxiv_id.clone(),
            venue: reference.venue.clone(),
            pages: reference.pages.clone(),
            volume: reference.volume.clone(),
            grobid_id: reference.source_id.clone(),
            paper_id: external_paper_id,
            citation_count,
            full_abstract,
        }
    }
}

impl From<&ExtractedDocument> for ExportedDocument {
    fn from(doc: &ExtractedDocument) -> Self {
        Self {
            main_paper: ExportedMainPaper::from(&doc.main_paper),
            references: doc.references.iter().map(ExportedReference::from).collect(),
        }
    }
}

pub fn to_json_pretty(doc: &ExtractedDocument) -> Result<String> {
    serde_json::to_string_pretty(&ExportedDocument::from(doc)).context("Failed to serialize export")
}

pub fn write_json(doc: &ExtractedDocument, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ExportedDocument::from(doc))
        .with_context(|| format!("Failed to write JSON to: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
