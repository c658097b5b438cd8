//! Field extractors. Each one takes a scope element and returns the field
//! value, or `None` when the document does not carry it.

use crate::models::Person;
use crate::parser::Element;
use crate::query::{self, IdScheme, ScopeUnit, TitleLevel, AUTHOR, FORENAME, PERS_NAME, SURNAME, TITLE};

/// Trimmed text of `el`; empty text counts as missing.
fn trimmed_text(el: &Element) -> Option<String> {
    let text = el.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn main_title(scope: &Element) -> Option<String> {
    query::find_main_title_at_level(scope, TitleLevel::Article).and_then(trimmed_text)
}

/// Article-level title, falling back to the monograph title for books and
/// other entries without an analytic part.
pub fn reference_title(scope: &Element) -> Option<String> {
    query::find_title_at_level(scope, TitleLevel::Article)
        .and_then(trimmed_text)
        .or_else(|| query::find_title_at_level(scope, TitleLevel::Monograph).and_then(trimmed_text))
}

pub fn person(author: &Element) -> Option<Person> {
    let pers_name = PERS_NAME.first(author)?;

    let forename = FORENAME
        .all(pers_name)
        .map(|f| f.text())
        .filter(|f| !f.trim().is_empty())
        .map(|f| f.trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let surname = SURNAME.first(pers_name).map(|s| s.text()).unwrap_or_default();

    Person::new(&forename, &surname)
}

/// Main-paper authors: direct `<author>` children of `<sourceDesc>` only, so
/// editors and affiliation metadata nested deeper are never picked up.
pub fn main_authors(scope: &Element) -> Vec<Person> {
    query::source_desc_authors(scope).filter_map(person).collect()
}

pub fn reference_authors(scope: &Element) -> Vec<Person> {
    AUTHOR.all(scope).filter_map(person).collect()
}

pub fn published_year(scope: &Element) -> Option<String> {
    let when = query::find_published_date(scope)?.attr("when")?;
    let year = when.split('-').next().unwrap_or_default().trim();
    if year.is_empty() {
        None
    } else {
        Some(year.to_string())
    }
}

pub fn identifier(scope: &Element, scheme: IdScheme) -> Option<String> {
    query::find_idno(scope, scheme).and_then(trimmed_text)
}

pub fn doi(scope: &Element) -> Option<String> {
    identifier(scope, IdScheme::Doi)
}

pub fn arxiv_id(scope: &Element) -> Option<String> {
    identifier(scope, IdScheme::Arxiv)
}

pub fn abstract_text(scope: &Element) -> Option<String> {
    let text = normalize_whitespace(&query::find_abstract(scope)?.text());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn venue(scope: &Element) -> Option<String> {
    let monogr = query::find_monogr(scope)?;
    TITLE.first(monogr).and_then(trimmed_text)
}

/// `from-to` when both bounds are present, `from` alone otherwise.
pub fn pages(scope: &Element) -> Option<String> {
    let scope_el = query::find_bibl_scope(scope, ScopeUnit::Page)?;
    let from = scope_el.attr("from").map(str::trim).filter(|s| !s.is_empty())?;
    match scope_el.attr("to").map(str::trim).filter(|s| !s.is_empty()) {
        Some(to) => Some(format!("{from}-{to}")),
        None => Some(from.to_string()),
    }
}

pub fn volume(scope: &Element) -> Option<String> {
    query::find_bibl_scope(scope, ScopeUnit::Volume).and_then(trimmed_text)
}
