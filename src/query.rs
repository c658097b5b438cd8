//! Typed element queries over a parsed TEI tree.
//!
//! Every lookup the field extractors perform is an [`ElementQuery`]: an element
//! name, the attribute values it must carry, and whether it searches direct
//! children or all descendants. Attribute matching goes through
//! [`Element::attr`], so it is namespace-insensitive.

use crate::parser::{Descendants, Element, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementQuery<'q> {
    name: &'q str,
    attributes: &'q [(&'q str, &'q str)],
    axis: Axis,
}

impl<'q> ElementQuery<'q> {
    pub const fn descendant(name: &'q str) -> Self {
        Self {
            name,
            attributes: &[],
            axis: Axis::Descendant,
        }
    }

    pub const fn child(name: &'q str) -> Self {
        Self {
            name,
            attributes: &[],
            axis: Axis::Child,
        }
    }

    /// Requires each `(name, value)` attribute to be present with exactly that value.
    pub const fn with_attributes(self, attributes: &'q [(&'q str, &'q str)]) -> Self {
        Self { attributes, ..self }
    }

    pub fn matches(&self, el: &Element) -> bool {
        el.name() == self.name
            && self
                .attributes
                .iter()
                .all(|(key, value)| el.attr(key) == Some(*value))
    }

    pub fn all<'a>(&self, scope: &'a Element) -> Matches<'a, 'q> {
        let source = match self.axis {
            Axis::Child => Source::Children(scope.children().iter()),
            Axis::Descendant => Source::Descendants(scope.descendants()),
        };
        Matches {
            query: *self,
            source,
        }
    }

    /// First match in document order.
    pub fn first<'a>(&self, scope: &'a Element) -> Option<&'a Element> {
        self.all(scope).next()
    }
}

enum Source<'a> {
    Children(std::slice::Iter<'a, Node>),
    Descendants(Descendants<'a>),
}

pub struct Matches<'a, 'q> {
    query: ElementQuery<'q>,
    source: Source<'a>,
}

impl<'a> Iterator for Matches<'a, '_> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        loop {
            let candidate = match &mut self.source {
                Source::Children(iter) => match iter.next()? {
                    Node::Element(el) => el,
                    Node::Text(_) => continue,
                },
                Source::Descendants(iter) => iter.next()?,
            };
            if self.query.matches(candidate) {
                return Some(candidate);
            }
        }
    }
}

/// `level` attribute values GROBID puts on `<title>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLevel {
    Article,
    Monograph,
}

impl TitleLevel {
    pub fn code(self) -> &'static str {
        match self {
            TitleLevel::Article => "a",
            TitleLevel::Monograph => "m",
        }
    }
}

/// `type` attribute values on `<idno>` (case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    Doi,
    Arxiv,
}

impl IdScheme {
    pub fn code(self) -> &'static str {
        match self {
            IdScheme::Doi => "DOI",
            IdScheme::Arxiv => "arXiv",
        }
    }
}

/// `unit` attribute values on `<biblScope>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeUnit {
    Page,
    Volume,
    Issue,
}

impl ScopeUnit {
    pub fn code(self) -> &'static str {
        match self {
            ScopeUnit::Page => "page",
            ScopeUnit::Volume => "volume",
            ScopeUnit::Issue => "issue",
        }
    }
}

pub const TEI_HEADER: ElementQuery<'static> = ElementQuery::descendant("teiHeader");
pub const SOURCE_DESC: ElementQuery<'static> = ElementQuery::descendant("sourceDesc");
pub const BIBL_STRUCT: ElementQuery<'static> = ElementQuery::descendant("biblStruct");
pub const AUTHOR: ElementQuery<'static> = ElementQuery::descendant("author");
pub const CHILD_AUTHOR: ElementQuery<'static> = ElementQuery::child("author");
pub const PERS_NAME: ElementQuery<'static> = ElementQuery::descendant("persName");
pub const FORENAME: ElementQuery<'static> = ElementQuery::descendant("forename");
pub const SURNAME: ElementQuery<'static> = ElementQuery::descendant("surname");
pub const PUBLISHED_DATE: ElementQuery<'static> =
    ElementQuery::descendant("date").with_attributes(&[("type", "published")]);
pub const ABSTRACT: ElementQuery<'static> = ElementQuery::descendant("abstract");
pub const MONOGR: ElementQuery<'static> = ElementQuery::descendant("monogr");
pub const TITLE: ElementQuery<'static> = ElementQuery::descendant("title");

/// The document header, or the root itself when there is no `<teiHeader>`.
pub fn find_header(root: &Element) -> &Element {
    TEI_HEADER.first(root).unwrap_or(root)
}

pub fn find_title_at_level(scope: &Element, level: TitleLevel) -> Option<&Element> {
    let attributes = [("level", level.code())];
    TITLE.with_attributes(&attributes).first(scope)
}

/// Like [`find_title_at_level`] but only titles marked `type="main"`.
pub fn find_main_title_at_level(scope: &Element, level: TitleLevel) -> Option<&Element> {
    let attributes = [("level", level.code()), ("type", "main")];
    TITLE.with_attributes(&attributes).first(scope)
}

pub fn find_idno(scope: &Element, scheme: IdScheme) -> Option<&Element> {
    let attributes = [("type", scheme.code())];
    ElementQuery::descendant("idno")
        .with_attributes(&attributes)
        .first(scope)
}

pub fn find_bibl_scope(scope: &Element, unit: ScopeUnit) -> Option<&Element> {
    let attributes = [("unit", unit.code())];
    ElementQuery::descendant("biblScope")
        .with_attributes(&attributes)
        .first(scope)
}

pub fn find_published_date(scope: &Element) -> Option<&Element> {
    PUBLISHED_DATE.first(scope)
}

pub fn find_abstract(scope: &Element) -> Option<&Element> {
    ABSTRACT.first(scope)
}

pub fn find_monogr(scope: &Element) -> Option<&Element> {
    MONOGR.first(scope)
}

/// Authors that are direct children of the first `<sourceDesc>`.
pub fn source_desc_authors(scope: &Element) -> impl Iterator<Item = &Element> {
    SOURCE_DESC
        .first(scope)
        .into_iter()
        .flat_map(|desc| CHILD_AUTHOR.all(desc))
}

pub fn bibl_structs(root: &Element) -> Matches<'_, 'static> {
    BIBL_STRUCT.all(root)
}
