//! Namespace URIs used by OSLC servers, and prefix bindings for OSLC queries.

use std::fmt;

/// A vocabulary namespace; terms are built by appending a local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }

    pub fn term(&self, local_name: &str) -> String {
        format!("{}{}", self.uri, local_name)
    }
}

pub const FOAF: Namespace = Namespace::new("foaf", "http://xmlns.com/foaf/0.1/");
pub const RDF: Namespace = Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
pub const RDFS: Namespace = Namespace::new("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
pub const OWL: Namespace = Namespace::new("owl", "http://www.w3.org/2002/07/owl#");
pub const DC: Namespace = Namespace::new("dc", "http://purl.org/dc/elements/1.1/");
pub const DCTERMS: Namespace = Namespace::new("dcterms", "http://purl.org/dc/terms/");
pub const OSLC: Namespace = Namespace::new("oslc", "http://open-services.net/ns/core#");
pub const OSLC_CONFIG: Namespace = Namespace::new("oslc_config", "http://open-services.net/ns/config#");
pub const OSLC_CM: Namespace = Namespace::new("oslc_cm", "http://open-services.net/ns/cm#");
pub const OSLC_RM: Namespace = Namespace::new("oslc_rm", "http://open-services.net/xmlns/rm/1.0/");
pub const OSLC_CM10: Namespace = Namespace::new("oslc_cm10", "http://open-services.net/xmlns/cm/1.0/");
pub const JD: Namespace = Namespace::new("jd", "http://jazz.net/xmlns/prod/jazz/discovery/1.0/");

/// Ordered `prefix=<uri>` bindings, rendered as the value of `oslc.prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixes {
    bindings: Vec<(String, String)>,
}

impl Prefixes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: Namespace) -> Self {
        self.bind(namespace.prefix, namespace.uri);
        self
    }

    /// Rebinding a prefix replaces its URI in place.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        match self.bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some(binding) => binding.1 = uri.to_string(),
            None => self.bindings.push((prefix.to_string(), uri.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for Prefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .bindings
            .iter()
            .map(|(prefix, uri)| format!("{}=<{}>", prefix, uri))
            .collect();
        write!(f, "{}", rendered.join(","))
    }
}
