//! In-memory triple store filled from RDF/XML documents.
//!
//! Statements keep document order; every lookup walks them in that order, so
//! "first match" always means first in the document.

use crate::utils::error::{OslcError, Result};
use oxiri::Iri;
use rio_api::model::{Literal as RioLiteral, Subject, Term as RioTerm, Triple};
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlError, RdfXmlParser};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Subject or non-literal object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Named(String),
    Blank(String),
}

impl Node {
    pub fn named(iri: impl Into<String>) -> Self {
        Node::Named(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Node::Blank(id.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Named(iri) => Some(iri),
            Node::Blank(_) => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Named(iri) => write!(f, "{}", iri),
            Node::Blank(id) => write!(f, "_:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Node(Node),
    Literal(Literal),
}

impl Term {
    pub fn named(iri: impl Into<String>) -> Self {
        Term::Node(Node::named(iri))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::simple(value))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Term::Node(node) => Some(node),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            Term::Node(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Node,
    pub predicate: String,
    pub object: Term,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    statements: Vec<Statement>,
    by_subject: HashMap<Node, Vec<usize>>,
    seen: HashSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an RDF/XML document, resolving relative IRIs against `base_uri`.
    pub fn parse_rdf_xml(document: &str, base_uri: &str) -> Result<Self> {
        let base = Iri::parse(base_uri.to_string()).map_err(|e| OslcError::GraphParseError {
            uri: base_uri.to_string(),
            message: e.to_string(),
        })?;

        let mut parser = RdfXmlParser::new(document.as_bytes(), Some(base));
        let mut graph = Graph::new();

        let parsed: std::result::Result<(), RdfXmlError> = parser.parse_all(&mut |triple| {
            graph.insert_triple(triple);
            Ok(())
        });
        parsed.map_err(|e| OslcError::GraphParseError {
            uri: base_uri.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Parsed {} statements from {}", graph.len(), base_uri);
        Ok(graph)
    }

    fn insert_triple(&mut self, triple: Triple<'_>) {
        let subject = match triple.subject {
            Subject::NamedNode(n) => Node::named(n.iri),
            Subject::BlankNode(b) => Node::blank(b.id),
            // quoted triples never appear in RDF/XML
            _ => return,
        };
        let object = match triple.object {
            RioTerm::NamedNode(n) => Term::named(n.iri),
            RioTerm::BlankNode(b) => Term::Node(Node::blank(b.id)),
            RioTerm::Literal(RioLiteral::Simple { value }) => Term::literal(value),
            RioTerm::Literal(RioLiteral::LanguageTaggedString { value, language }) => {
                Term::Literal(Literal {
                    value: value.to_string(),
                    datatype: None,
                    language: Some(language.to_string()),
                })
            }
            RioTerm::Literal(RioLiteral::Typed { value, datatype }) => Term::Literal(Literal {
                value: value.to_string(),
                datatype: Some(datatype.iri.to_string()),
                language: None,
            }),
            _ => return,
        };
        self.insert(subject, triple.predicate.iri, object);
    }

    /// Adds a statement. Returns `false` when the graph already holds it.
    pub fn insert(&mut self, subject: Node, predicate: impl Into<String>, object: Term) -> bool {
        let statement = Statement {
            subject,
            predicate: predicate.into(),
            object,
        };
        if !self.seen.insert(statement.clone()) {
            return false;
        }
        let index = self.statements.len();
        self.by_subject.entry(statement.subject.clone()).or_default().push(index);
        self.statements.push(statement);
        true
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn statements_about(&self, subject: &Node) -> impl Iterator<Item = &Statement> + '_ {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&index| &self.statements[index])
    }

    pub fn has_statements(&self, subject: &Node) -> bool {
        self.by_subject.contains_key(subject)
    }

    /// Every object of `subject predicate ?o`.
    pub fn objects<'a>(
        &'a self,
        subject: &Node,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.statements_about(subject)
            .filter(move |st| st.predicate == predicate)
            .map(|st| &st.object)
    }

    /// Statements matching a pattern; `None` is a wildcard.
    pub fn statements_matching(
        &self,
        subject: Option<&Node>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> Vec<&Statement> {
        let matches = |st: &&Statement| {
            predicate.map_or(true, |p| st.predicate == p) && object.map_or(true, |o| &st.object == o)
        };
        match subject {
            Some(subject) => self.statements_about(subject).filter(matches).collect(),
            None => self.statements.iter().filter(matches).collect(),
        }
    }

    pub fn contains(&self, subject: &Node, predicate: &str, object: &Term) -> bool {
        self.objects(subject, predicate).any(|o| o == object)
    }
}
