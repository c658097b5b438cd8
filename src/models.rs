use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub forename: String,
    pub surname: String,
}

impl Person {
    /// Returns `None` when both parts are empty after trimming.
    pub fn new(forename: &str, surname: &str) -> Option<Self> {
        let forename = forename.trim();
        let surname = surname.trim();
        if forename.is_empty() && surname.is_empty() {
            return None;
        }
        Some(Self {
            forename: forename.to_string(),
            surname: surname.to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname).trim().to_string()
    }
}

/// Fields shared by the main paper and every reference.
///
/// `title` is `None` when nothing usable was found; the "Unknown" / "No title"
/// sentinels are only applied when records are exported or printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: Option<String>,
    pub authors: Vec<Person>,
    pub year: Option<String>,
    pub doi: Option<String>,
    pub arxiv_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainPaper {
    #[serde(flatten)]
    pub paper: PaperRecord,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// `xml:id` assigned by GROBID, e.g. `b12`. Matches in-text citation targets.
    pub source_id: String,
    #[serde(flatten)]
    pub paper: PaperRecord,
    pub venue: Option<String>,
    pub pages: Option<String>,
    pub volume: Option<String>,
    /// Filled in by a downstream resolver, never by extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

impl Reference {
    pub fn with_enrichment(self, enrichment: Enrichment) -> Self {
        Self {
            enrichment: Some(enrichment),
            ..self
        }
    }
}

/// Data attached to a reference after resolving it against an external
/// bibliographic database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub external_paper_id: Option<String>,
    pub citation_count: Option<u64>,
    pub full_abstract: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub main_paper: MainPaper,
    pub references: Vec<Reference>,
}
