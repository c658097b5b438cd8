//! teiref: bibliographic extraction from GROBID TEI-XML
//!
//! GROBID turns a PDF into TEI-XML. This crate reads that XML and produces a
//! structured record of the paper itself plus its ordered reference list,
//! ready for storage, deduplication or citation-graph construction.
//!
//! # Pipeline
//!
//! 1. **Load** -- [`parser`] builds an owned element tree; malformed XML is
//!    rejected with [`error::ExtractError::MalformedDocument`]
//! 2. **Query** -- [`query`] holds the typed element lookups (name, required
//!    attributes, child or descendant axis), namespace-insensitive
//! 3. **Extract fields** -- [`fields`] has one pure function per field; a
//!    missing field is `None`, never an error
//! 4. **Assemble** -- [`extract`] builds one [`models::MainPaper`] from the
//!    header and one [`models::Reference`] per `biblStruct` whose id is
//!    `b<digits>`, in document order
//!
//! Extraction of one document touches no shared state, so [`batch`] can run
//! many of them on a rayon pool.
//!
//! # Key Modules
//!
//! - [`models`] -- Records (`Person`, `PaperRecord`, `MainPaper`, `Reference`, `Enrichment`)
//! - [`export`] -- `parsed_references.json` layout with title sentinels applied
//! - [`report`] -- Plain-text summary printed by the CLI
//! - [`batch`] -- Parallel directory extraction
//! - [`stats`] -- Atomic counters for batch runs
//! - [`config`] -- Constants
//!
//! # Example Usage
//!
//! ```bash
//! # One document: print a summary, write parsed_references.json next to it
//! teiref extract data/outputs/paper.tei.xml
//!
//! # A whole GROBID output directory, 8 workers
//! teiref batch -i data/outputs -o data/parsed --threads 8
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fields;
pub mod models;
pub mod parser;
pub mod query;
pub mod report;
pub mod stats;

pub use error::{ExtractError, Result};
pub use extract::{extract_bytes, extract_document, extract_file};
pub use models::{Enrichment, ExtractedDocument, MainPaper, PaperRecord, Person, Reference};
