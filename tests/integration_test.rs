//! Integration tests for the teiref extraction pipeline.
//!
//! Tests run the full path from TEI-XML input through to records, the JSON
//! export and batch output directories:
//!
//! - **Document Tests** -- main paper fields, author filtering, reference order
//! - **Reference Tests** -- id filtering, per-field extraction, fallbacks
//! - **Export Tests** -- legacy JSON layout, sentinels, round-trips
//! - **Error Tests** -- malformed input
//! - **Batch Tests** -- parallel directory extraction with a malformed file mixed in
//!
//! All tests share the `sample_tei()` fixture, a trimmed GROBID
//! `processFulltextDocument` output. It contains:
//! - a header with a main title, two direct `sourceDesc` authors (one empty),
//!   a published date, DOI, arXiv id and a two-paragraph abstract
//! - a nested header `biblStruct` (no `xml:id`) with its own analytic author
//! - four bibliography entries `b0`..`b3`, plus a `funding_0` entry that must be skipped

use std::fs;
use tempfile::TempDir;
use teiref::batch::{run_batch, BatchConfig};
use teiref::export::{self, ExportedDocument};
use teiref::{extract_bytes, extract_document, extract_file, ExtractError, ExtractedDocument};

fn sample_tei() -> &'static str {
    r##"<?xml version="1.0" encoding="UTF-8"?>
<TEI xml:space="preserve" xmlns="http://www.tei-c.org/ns/1.0"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:xlink="http://www.w3.org/1999/xlink">
    <teiHeader xml:lang="en">
        <fileDesc>
            <titleStmt>
                <title level="a" type="main">Attention Is All You Need</title>
            </titleStmt>
            <publicationStmt>
                <publisher/>
                <availability status="unknown"><licence/></availability>
                <date type="published" when="2017-06-12">12 Jun 2017</date>
            </publicationStmt>
            <sourceDesc>
                <author><persName><forename type="first">Ashish</forename><surname>Vaswani</surname></persName></author>
                <author><persName><forename type="first"></forename><surname></surname></persName></author>
                <author><persName><forename type="first">Noam</forename><forename type="middle">M</forename><surname>Shazeer</surname></persName></author>
                <biblStruct>
                    <analytic>
                        <author><persName><forename>Nested</forename><surname>Author</surname></persName></author>
                        <title level="a" type="main">Attention Is All You Need</title>
                    </analytic>
                    <monogr><imprint><date type="published" when="2017-06-12"/></imprint></monogr>
                    <idno type="arXiv">arXiv:1706.03762v5</idno>
                    <idno type="DOI">10.48550/arXiv.1706.03762</idno>
                </biblStruct>
            </sourceDesc>
        </fileDesc>
        <profileDesc>
            <abstract>
                <div xmlns="http://www.tei-c.org/ns/1.0">
                    <p>The dominant sequence transduction models are based on
                       complex recurrent or convolutional neural networks.</p>
                    <p>We propose a new simple network architecture, the Transformer.</p>
                </div>
            </abstract>
        </profileDesc>
    </teiHeader>
    <text xml:lang="en">
        <body><div><p>See <ref type="bibr" target="#b0">[1]</ref>.</p></div></body>
        <back>
            <div type="references">
                <listBibl>
                    <biblStruct xml:id="b0">
                        <analytic>
                            <title level="a" type="main">Layer normalization</title>
                            <author><persName><forename type="first">Jimmy</forename><forename type="middle">Lei</forename><surname>Ba</surname></persName></author>
                            <author><persName><forename type="first">Jamie</forename><forename type="middle">Ryan</forename><surname>Kiros</surname></persName></author>
                            <author><persName><forename type="first">Geoffrey</forename><forename type="middle">E</forename><surname>Hinton</surname></persName></author>
                            <idno type="arXiv">arXiv:1607.06450</idno>
                        </analytic>
                        <monogr>
                            <title level="j">arXiv preprint</title>
                            <imprint><date type="published" when="2016">2016</date></imprint>
                        </monogr>
                    </biblStruct>
                    <biblStruct xml:id="b1">
                        <analytic>
                            <title level="a" type="main">Long short-term memory</title>
                            <author><persName><forename type="first">Sepp</forename><surname>Hochreiter</surname></persName></author>
                            <author><persName><forename type="first">Jürgen</forename><surname>Schmidhuber</surname></persName></author>
                            <idno type="DOI">10.1162/neco.1997.9.8.1735</idno>
                        </analytic>
                        <monogr>
                            <title level="j">Neural Computation</title>
                            <imprint>
                                <biblScope unit="volume">9</biblScope>
                                <biblScope unit="issue">8</biblScope>
                                <biblScope unit="page" from="1735" to="1780"/>
                                <date type="published" when="1997-11-15">1997</date>
                            </imprint>
                        </monogr>
                    </biblStruct>
                    <biblStruct xml:id="funding_0">
                        <analytic><title level="a">Grant 12345</title></analytic>
                    </biblStruct>
                    <biblStruct xml:id="b2">
                        <monogr>
                            <title level="m">Deep Learning</title>
                            <author><persName><forename>Ian</forename><surname>Goodfellow</surname></persName></author>
                            <imprint>
                                <publisher>MIT Press</publisher>
                                <biblScope unit="page" from="200"/>
                                <date type="published" when="2016"/>
                            </imprint>
                        </monogr>
                    </biblStruct>
                    <biblStruct xml:id="b3">
                        <monogr>
                            <imprint><date type="published">n.d.</date></imprint>
                        </monogr>
                    </biblStruct>
                </listBibl>
            </div>
        </back>
    </text>
</TEI>
"##
}

fn extract_sample() -> ExtractedDocument {
    extract_document(sample_tei()).unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Main paper
// ---------------------------------------------------------------------------

#[test]
fn main_paper_title() {
    let doc = extract_sample();
    assert_eq!(
        doc.main_paper.paper.title.as_deref(),
        Some("Attention Is All You Need")
    );
}

#[test]
fn main_paper_authors_are_direct_source_desc_children() {
    let doc = extract_sample();
    let names: Vec<_> = doc
        .main_paper
        .paper
        .authors
        .iter()
        .map(|p| p.full_name())
        .collect();
    // the empty author is dropped and the nested biblStruct author is not reached
    assert_eq!(names, vec!["Ashish Vaswani", "Noam M Shazeer"]);
}

#[test]
fn main_paper_year_and_identifiers() {
    let doc = extract_sample();
    let main = &doc.main_paper.paper;
    assert_eq!(main.year.as_deref(), Some("2017"));
    assert_eq!(main.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
    assert_eq!(main.arxiv_id.as_deref(), Some("arXiv:1706.03762v5"));
}

#[test]
fn main_paper_abstract_is_whitespace_normalized() {
    let doc = extract_sample();
    assert_eq!(
        doc.main_paper.abstract_text.as_deref(),
        Some(
            "The dominant sequence transduction models are based on complex recurrent or \
             convolutional neural networks. We propose a new simple network architecture, \
             the Transformer."
        )
    );
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

#[test]
fn references_filtered_and_in_document_order() {
    let doc = extract_sample();
    let ids: Vec<_> = doc.references.iter().map(|r| r.source_id.as_str()).collect();
    assert_eq!(ids, vec!["b0", "b1", "b2", "b3"]);
}

#[test]
fn reference_full_journal_article() {
    let doc = extract_sample();
    let r = &doc.references[1];
    assert_eq!(r.paper.title.as_deref(), Some("Long short-term memory"));
    let names: Vec<_> = r.paper.authors.iter().map(|p| p.full_name()).collect();
    assert_eq!(names, vec!["Sepp Hochreiter", "Jürgen Schmidhuber"]);
    assert_eq!(r.paper.year.as_deref(), Some("1997"));
    assert_eq!(r.paper.doi.as_deref(), Some("10.1162/neco.1997.9.8.1735"));
    assert_eq!(r.paper.arxiv_id, None);
    assert_eq!(r.venue.as_deref(), Some("Neural Computation"));
    assert_eq!(r.pages.as_deref(), Some("1735-1780"));
    assert_eq!(r.volume.as_deref(), Some("9"));
    assert!(r.enrichment.is_none());
}

#[test]
fn reference_middle_names_joined() {
    let doc = extract_sample();
    let first = &doc.references[0].paper.authors[0];
    assert_eq!(first.forename, "Jimmy Lei");
    assert_eq!(first.surname, "Ba");
    assert_eq!(doc.references[0].paper.arxiv_id.as_deref(), Some("arXiv:1607.06450"));
    assert_eq!(doc.references[0].pages, None);
}

#[test]
fn reference_book_falls_back_to_monograph_title() {
    let doc = extract_sample();
    let book = &doc.references[2];
    assert_eq!(book.paper.title.as_deref(), Some("Deep Learning"));
    assert_eq!(book.venue.as_deref(), Some("Deep Learning"));
    assert_eq!(book.pages.as_deref(), Some("200"));
    assert_eq!(book.paper.authors.len(), 1);
}

#[test]
fn reference_with_nothing_extractable() {
    let doc = extract_sample();
    let empty = &doc.references[3];
    assert_eq!(empty.source_id, "b3");
    assert_eq!(empty.paper.title, None);
    assert!(empty.paper.authors.is_empty());
    assert_eq!(empty.paper.year, None);
    assert_eq!(empty.venue, None);
    assert_eq!(empty.pages, None);
    assert_eq!(empty.volume, None);
}

#[test]
fn document_without_bibliography() {
    let xml = r#"<TEI><teiHeader><fileDesc><titleStmt>
        <title level="a" type="main">Lonely</title></titleStmt></fileDesc></teiHeader></TEI>"#;
    let doc = extract_document(xml).unwrap();
    assert_eq!(doc.main_paper.paper.title.as_deref(), Some("Lonely"));
    assert!(doc.references.is_empty());
}

#[test]
fn repeated_extraction_is_identical() {
    assert_eq!(extract_sample(), extract_sample());
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn serde_round_trip_preserves_every_field() {
    let doc = extract_sample();
    let json = serde_json::to_string(&doc).unwrap();
    let back: ExtractedDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn export_applies_sentinels_and_legacy_keys() {
    let doc = extract_sample();
    let value: serde_json::Value =
        serde_json::from_str(&export::to_json_pretty(&doc).unwrap()).unwrap();

    assert_eq!(value["main_paper"]["title"], "Attention Is All You Need");
    assert_eq!(value["main_paper"]["arxiv"], "arXiv:1706.03762v5");
    assert_eq!(value["main_paper"]["authors"][1]["full_name"], "Noam M Shazeer");
    assert_eq!(value["references"][1]["grobid_id"], "b1");
    assert_eq!(value["references"][3]["title"], "No title");
    assert!(value["references"][3]["year"].is_null());
    assert!(value["references"][0]["citation_count"].is_null());
}

#[test]
fn export_untitled_main_paper() {
    let doc = extract_document("<TEI><teiHeader/></TEI>").unwrap();
    let exported = ExportedDocument::from(&doc);
    assert_eq!(exported.main_paper.title, "Unknown");
}

#[test]
fn export_written_to_disk_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("parsed_references.json");
    let doc = extract_sample();

    export::write_json(&doc, &path).unwrap();

    let read_back: ExportedDocument =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read_back, ExportedDocument::from(&doc));
    assert_eq!(read_back.references.len(), 4);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn unclosed_tag_is_malformed() {
    let err = extract_document("<TEI><teiHeader><title>Broken</teiHeader></TEI>").unwrap_err();
    assert!(matches!(err, ExtractError::MalformedDocument { .. }));
}

#[test]
fn truncated_sample_is_malformed() {
    let sample = sample_tei();
    let mut cut = sample.len() / 2;
    while !sample.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &sample[..cut];
    assert!(extract_document(truncated).unwrap_err().is_malformed());
}

#[test]
fn non_utf8_bytes_are_malformed() {
    let err = extract_bytes(b"<TEI>\xc3\x28</TEI>").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn extract_file_reads_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "paper.tei.xml", sample_tei());
    let doc = extract_file(&path).unwrap();
    assert_eq!(doc, extract_sample());
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[test]
fn batch_extracts_directory() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_file(&input, "one.tei.xml", sample_tei());
    write_file(&input, "two.xml", "<TEI><teiHeader/></TEI>");
    write_file(&input, "broken.xml", "<TEI><teiHeader>");
    write_file(&input, "notes.txt", "not a TEI file");

    let config = BatchConfig {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().join("parsed"),
        threads: Some(2),
        limit: None,
        dry_run: false,
    };
    let stats = run_batch(&config).unwrap();

    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.malformed(), 1);
    assert_eq!(stats.failed(), 0);
    assert_eq!(stats.references(), 4);
    assert_eq!(stats.untitled(), 1);
    assert_eq!(stats.outputs(), 2);

    let one: ExportedDocument = serde_json::from_str(
        &fs::read_to_string(output.path().join("parsed/one.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(one.references.len(), 4);
    assert!(output.path().join("parsed/two.json").exists());
    assert!(!output.path().join("parsed/broken.json").exists());
}

#[test]
fn batch_dry_run_writes_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_file(&input, "one.xml", sample_tei());

    let config = BatchConfig {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().join("parsed"),
        threads: None,
        limit: None,
        dry_run: true,
    };
    let stats = run_batch(&config).unwrap();

    assert_eq!(stats.processed(), 1);
    assert_eq!(stats.outputs(), 0);
    assert!(!output.path().join("parsed").exists());
}

#[test]
fn batch_respects_limit() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for name in ["a.xml", "b.xml", "c.xml"] {
        write_file(&input, name, sample_tei());
    }

    let config = BatchConfig {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        threads: Some(1),
        limit: Some(2),
        dry_run: false,
    };
    let stats = run_batch(&config).unwrap();

    assert_eq!(stats.processed(), 2);
    assert!(output.path().join("a.json").exists());
    assert!(output.path().join("b.json").exists());
    assert!(!output.path().join("c.json").exists());
}

#[test]
fn batch_missing_input_directory_fails() {
    let output = TempDir::new().unwrap();
    let config = BatchConfig {
        input_dir: output.path().join("does-not-exist"),
        output_dir: output.path().to_path_buf(),
        threads: None,
        limit: None,
        dry_run: true,
    };
    assert!(run_batch(&config).is_err());
}

#[test]
fn batch_keeps_colliding_outputs_apart() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_file(&input, "paper.tei.xml", sample_tei());
    write_file(&input, "paper.xml", "<TEI><teiHeader/></TEI>");

    let config = BatchConfig {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        threads: Some(2),
        limit: None,
        dry_run: false,
    };
    let stats = run_batch(&config).unwrap();

    assert_eq!(stats.outputs(), 2);
    assert!(!output.path().join("paper.json").exists());
    let full: ExportedDocument = serde_json::from_str(
        &fs::read_to_string(output.path().join("paper.tei.xml.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(full.references.len(), 4);
    let empty: ExportedDocument = serde_json::from_str(
        &fs::read_to_string(output.path().join("paper.xml.json")).unwrap(),
    )
    .unwrap();
    assert!(empty.references.is_empty());
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 2);
}

#[test]
fn batch_failed_write_is_not_counted_as_processed() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_file(&input, "one.xml", sample_tei());
    // A directory where the output file should go makes the write fail
    fs::create_dir_all(output.path().join("one.json")).unwrap();

    let config = BatchConfig {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        threads: None,
        limit: None,
        dry_run: false,
    };
    let stats = run_batch(&config).unwrap();

    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.processed(), 0);
    assert_eq!(stats.references(), 0);
    assert_eq!(stats.outputs(), 0);
}
