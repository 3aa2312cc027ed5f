use crate::adapters::graph::{Graph, Node, Term};
use crate::domain::domain_table::{CatalogForm, Domain, DomainTable};
use crate::domain::namespace::OSLC;
use crate::utils::error::{OslcError, Result};
use url::Url;

/// A parsed rootservices document.
#[derive(Debug, Clone)]
pub struct RootServices {
    uri: String,
    graph: Graph,
}

/// A catalog URI and the domain it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub uri: String,
    pub domain: String,
}

/// `<server>/rootservices`
pub fn root_services_url(server_uri: &Url) -> Result<Url> {
    append_segment(server_uri, "rootservices")
}

pub(crate) fn append_segment(base: &Url, segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| OslcError::ConfigError {
            message: format!("{} cannot be used as a server base URI", base),
        })?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

impl RootServices {
    pub fn parse(uri: &str, document: &str) -> Result<Self> {
        Ok(Self {
            uri: uri.to_string(),
            graph: Graph::parse_rdf_xml(document, uri)?,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Catalog URI for `domain`, or `None` when no candidate declares it.
    ///
    /// The domain must be registered in `table`; the caller's `Domain` value
    /// is only trusted after that check.
    pub fn catalog_uri(&self, table: &DomainTable, domain_uri: &str) -> Result<Option<String>> {
        let domain = table.lookup(domain_uri)?;
        Ok(self.catalog_entry(domain).map(|entry| entry.uri))
    }

    pub fn catalog_entry(&self, domain: &Domain) -> Option<CatalogEntry> {
        let root = Node::named(self.uri.as_str());
        let domain_predicate = OSLC.term("domain");
        let requested = Term::named(domain.uri());

        let found = self
            .graph
            .objects(&root, &domain.catalog_predicate)
            .filter_map(Term::as_node)
            .filter_map(|candidate| Some((candidate, candidate.as_iri()?)))
            .find(|(candidate, _)| {
                if domain.catalog_form == CatalogForm::Direct
                    && self.graph.objects(candidate, &domain_predicate).next().is_none()
                {
                    return true;
                }
                self.graph.contains(candidate, &domain_predicate, &requested)
            })
            .map(|(_, iri)| iri.to_string())?;

        tracing::debug!("Catalog for {} in {}: {}", domain.alias, self.uri, found);
        Some(CatalogEntry {
            uri: found,
            domain: domain.uri().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://jazz.example.com/ccm/rootservices";

    const CCM_ROOTSERVICES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:oslc="http://open-services.net/ns/core#"
    xmlns:jd="http://jazz.net/xmlns/prod/jazz/discovery/1.0/">
<rdf:Description rdf:about="https://jazz.example.com/ccm/rootservices">
  <jd:oslcCatalogs>
    <oslc:ServiceProviderCatalog rdf:about="https://jazz.example.com/ccm/oslc/qm-catalog">
      <oslc:domain rdf:resource="http://open-services.net/ns/qm#"/>
    </oslc:ServiceProviderCatalog>
  </jd:oslcCatalogs>
  <jd:oslcCatalogs>
    <oslc:ServiceProviderCatalog rdf:about="https://jazz.example.com/ccm/oslc/workitems/catalog">
      <oslc:domain rdf:resource="http://open-services.net/ns/cm#"/>
    </oslc:ServiceProviderCatalog>
  </jd:oslcCatalogs>
</rdf:Description>
</rdf:RDF>"#;

    const RM_ROOTSERVICES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:oslc_rm="http://open-services.net/xmlns/rm/1.0/">
<rdf:Description rdf:about="https://jazz.example.com/rm/rootservices">
  <oslc_rm:rmServiceProviders rdf:resource="https://jazz.example.com/rm/oslc_rm/catalog"/>
</rdf:Description>
</rdf:RDF>"#;

    #[test]
    fn test_declared_catalog_filtered_by_domain() {
        let table = DomainTable::standard();
        let root = RootServices::parse(ROOT, CCM_ROOTSERVICES).unwrap();
        let uri = root.catalog_uri(&table, "http://open-services.net/ns/cm#").unwrap();
        assert_eq!(uri.as_deref(), Some("https://jazz.example.com/ccm/oslc/workitems/catalog"));
    }

    #[test]
    fn test_direct_catalog_link() {
        let table = DomainTable::standard();
        let root = RootServices::parse("https://jazz.example.com/rm/rootservices", RM_ROOTSERVICES).unwrap();
        let uri = root.catalog_uri(&table, "http://open-services.net/xmlns/rm/1.0/").unwrap();
        assert_eq!(uri.as_deref(), Some("https://jazz.example.com/rm/oslc_rm/catalog"));
    }

    #[test]
    fn test_only_non_matching_entries_is_none() {
        let table = DomainTable::standard();
        let document = CCM_ROOTSERVICES.replace("http://open-services.net/ns/cm#", "http://open-services.net/ns/am#");
        let root = RootServices::parse(ROOT, &document).unwrap();
        let uri = root.catalog_uri(&table, "http://open-services.net/ns/cm#").unwrap();
        assert_eq!(uri, None);
    }

    #[test]
    fn test_missing_predicate_is_none() {
        let table = DomainTable::standard();
        let root = RootServices::parse(ROOT, CCM_ROOTSERVICES).unwrap();
        let uri = root.catalog_uri(&table, "http://open-services.net/ns/config#").unwrap();
        assert_eq!(uri, None);
    }

    #[test]
    fn test_unregistered_domain_is_unsupported() {
        let table = DomainTable::standard();
        let root = RootServices::parse(ROOT, CCM_ROOTSERVICES).unwrap();
        let err = root.catalog_uri(&table, "http://open-services.net/ns/qm#").unwrap_err();
        assert!(matches!(err, OslcError::UnsupportedDomain { .. }));
    }

    #[test]
    fn test_root_services_url() {
        let with_slash = Url::parse("https://jazz.example.com:9443/rm/").unwrap();
        let without = Url::parse("https://jazz.example.com:9443/rm").unwrap();
        assert_eq!(
            root_services_url(&with_slash).unwrap().as_str(),
            "https://jazz.example.com:9443/rm/rootservices"
        );
        assert_eq!(
            root_services_url(&without).unwrap().as_str(),
            "https://jazz.example.com:9443/rm/rootservices"
        );
    }
}
