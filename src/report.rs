use crate::config::{
    MAIN_TITLE_SENTINEL, REFERENCE_TITLE_SENTINEL, SUMMARY_MAX_AUTHORS,
    SUMMARY_MAX_REFERENCE_AUTHORS,
};
use crate::models::{ExtractedDocument, Person};
use std::fmt;

const RULE_WIDTH: usize = 80;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn names(authors: &[Person], limit: usize) -> Vec<String> {
    authors.iter().take(limit).map(Person::full_name).collect()
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

/// Human-readable summary of an extraction: the main paper, then the first
/// `preview` references.
pub struct Summary<'a> {
    doc: &'a ExtractedDocument,
    preview: usize,
}

impl<'a> Summary<'a> {
    pub fn new(doc: &'a ExtractedDocument, preview: usize) -> Self {
        Self { doc, preview }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc;
        let main = &doc.main_paper.paper;

        writeln!(f, "{}", rule())?;
        writeln!(f, "MAIN PAPER")?;
        writeln!(f, "{}", rule())?;
        writeln!(
            f,
            "Title: {}",
            main.title.as_deref().unwrap_or(MAIN_TITLE_SENTINEL)
        )?;

        if !main.authors.is_empty() {
            writeln!(
                f,
                "Authors: {}",
                names(&main.authors, SUMMARY_MAX_AUTHORS).join(", ")
            )?;
            if main.authors.len() > SUMMARY_MAX_AUTHORS {
                writeln!(
                    f,
                    "         + {} more",
                    main.authors.len() - SUMMARY_MAX_AUTHORS
                )?;
            }
        }

        writeln!(f, "Year: {}", or_none(main.year.as_deref()))?;
        writeln!(f, "arXiv: {}", or_none(main.arxiv_id.as_deref()))?;

        writeln!(f)?;
        writeln!(f, "{}", rule())?;
        writeln!(f, "REFERENCES: {} found", doc.references.len())?;
        writeln!(f, "{}", rule())?;

        for (i, reference) in doc.references.iter().take(self.preview).enumerate() {
            let paper = &reference.paper;
            writeln!(f)?;
            writeln!(
                f,
                "[{}] {}",
                i + 1,
                paper.title.as_deref().unwrap_or(REFERENCE_TITLE_SENTINEL)
            )?;
            if !paper.authors.is_empty() {
                let shown = names(&paper.authors, SUMMARY_MAX_REFERENCE_AUTHORS).join(", ");
                if paper.authors.len() > SUMMARY_MAX_REFERENCE_AUTHORS {
                    writeln!(
                        f,
                        "    Authors: {} + {} more",
                        shown,
                        paper.authors.len() - SUMMARY_MAX_REFERENCE_AUTHORS
                    )?;
                } else {
                    writeln!(f, "    Authors: {}", shown)?;
                }
            }
            writeln!(f, "    Year: {}", or_none(paper.year.as_deref()))?;
            if let Some(arxiv) = &paper.arxiv_id {
                writeln!(f, "    arXiv: {}", arxiv)?;
            }
        }

        if doc.references.len() > self.preview {
            writeln!(f)?;
            writeln!(f, "... and {} more", doc.references.len() - self.preview)?;
        }
        Ok(())
    }
}
