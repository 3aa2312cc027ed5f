use crate::adapters::graph::Graph;
use crate::domain::namespace::DCTERMS;
use crate::utils::error::Result;
use regex::Regex;

/// A parsed service provider catalog.
#[derive(Debug, Clone)]
pub struct ServiceProviderCatalog {
    uri: String,
    graph: Graph,
}

impl ServiceProviderCatalog {
    pub fn parse(uri: &str, document: &str) -> Result<Self> {
        Ok(Self {
            uri: uri.to_string(),
            graph: Graph::parse_rdf_xml(document, uri)?,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// URI of the first titled resource whose `dcterms:title` contains
    /// `container_title`. The title is matched literally and case-sensitively.
    pub fn find_service_provider(&self, container_title: &str) -> Option<String> {
        let pattern = Regex::new(&regex::escape(container_title)).ok()?;
        let title = DCTERMS.term("title");

        let found = self
            .graph
            .statements_matching(None, Some(title.as_str()), None)
            .into_iter()
            .filter(|st| {
                st.object
                    .as_literal()
                    .is_some_and(|literal| pattern.is_match(&literal.value))
            })
            .find_map(|st| st.subject.as_iri())
            .map(str::to_string);

        match &found {
            Some(uri) => tracing::debug!("Service provider '{}' is {}", container_title, uri),
            None => tracing::debug!("No service provider titled '{}' in {}", container_title, self.uri),
        }
        found
    }

    /// Every `(title, uri)` pair in the catalog, in document order.
    pub fn titles(&self) -> Vec<(String, String)> {
        let title = DCTERMS.term("title");
        self.graph
            .statements_matching(None, Some(title.as_str()), None)
            .into_iter()
            .filter_map(|st| {
                let literal = st.object.as_literal()?;
                let uri = st.subject.as_iri()?;
                Some((literal.value.clone(), uri.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_URI: &str = "https://jazz.example.com/rm/oslc_rm/catalog";

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc="http://open-services.net/ns/core#">
  <oslc:ServiceProviderCatalog rdf:about="https://jazz.example.com/rm/oslc_rm/catalog">
    <oslc:serviceProvider>
      <oslc:ServiceProvider rdf:about="https://jazz.example.com/rm/oslc_rm/_golf/services.xml">
        <dcterms:title>Splendid Agile Golf</dcterms:title>
      </oslc:ServiceProvider>
    </oslc:serviceProvider>
    <oslc:serviceProvider>
      <oslc:ServiceProvider rdf:about="https://jazz.example.com/rm/oslc_rm/_acme/services.xml">
        <dcterms:title>Acme Project (v1.2)</dcterms:title>
      </oslc:ServiceProvider>
    </oslc:serviceProvider>
    <oslc:serviceProvider>
      <oslc:ServiceProvider rdf:about="https://jazz.example.com/rm/oslc_rm/_acme2/services.xml">
        <dcterms:title>Acme Project (v1.2) Archive</dcterms:title>
      </oslc:ServiceProvider>
    </oslc:serviceProvider>
  </oslc:ServiceProviderCatalog>
</rdf:RDF>"#;

    fn catalog() -> ServiceProviderCatalog {
        ServiceProviderCatalog::parse(CATALOG_URI, CATALOG).unwrap()
    }

    #[test]
    fn test_exact_title_found() {
        assert_eq!(
            catalog().find_service_provider("Splendid Agile Golf").as_deref(),
            Some("https://jazz.example.com/rm/oslc_rm/_golf/services.xml")
        );
    }

    #[test]
    fn test_substring_match_takes_first_in_document_order() {
        assert_eq!(
            catalog().find_service_provider("Acme").as_deref(),
            Some("https://jazz.example.com/rm/oslc_rm/_acme/services.xml")
        );
    }

    #[test]
    fn test_regex_characters_are_literal() {
        assert_eq!(
            catalog().find_service_provider("(v1.2)").as_deref(),
            Some("https://jazz.example.com/rm/oslc_rm/_acme/services.xml")
        );
        assert_eq!(catalog().find_service_provider("v1x2"), None);
        assert_eq!(catalog().find_service_provider(".*"), None);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(catalog().find_service_provider("acme project"), None);
    }

    #[test]
    fn test_unknown_title_is_none() {
        assert_eq!(catalog().find_service_provider("Nonexistent"), None);
    }

    #[test]
    fn test_titles_lists_providers() {
        let titles = catalog().titles();
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[1].0, "Acme Project (v1.2)");
    }
}
