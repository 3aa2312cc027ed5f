use crate::adapters::graph::{Graph, Node, Term};
use crate::core::fetcher::AuthenticatingFetcher;
use crate::core::projector::{local_name, project};
use crate::domain::domain_table::Domain;
use crate::domain::model::{PropertyValue, QueryCapability, Resource};
use crate::domain::namespace::{OSLC, RDF};
use crate::domain::ports::Transport;
use crate::utils::error::{OslcError, Result};
use regex::Regex;
use url::Url;

/// A fully loaded service provider. Only [`ServiceProvider::load`] and
/// [`ServiceProvider::from_document`] build one, so every instance a caller
/// sees already has its capabilities.
#[derive(Debug, Clone)]
pub struct ServiceProvider {
    uri: String,
    resource: Resource,
    query_capabilities: Vec<QueryCapability>,
}

impl ServiceProvider {
    pub async fn load<T: Transport>(
        uri: &str,
        domain: &Domain,
        fetcher: &mut AuthenticatingFetcher<T>,
    ) -> Result<Self> {
        let url = Url::parse(uri)?;
        let response = fetcher.get(&url).await?;
        let provider = Self::from_document(uri, domain, &response.body)?;

        tracing::info!(
            "📡 Loaded service provider {} ({} query capabilities)",
            uri,
            provider.query_capabilities.len()
        );
        Ok(provider)
    }

    pub fn from_document(uri: &str, domain: &Domain, document: &str) -> Result<Self> {
        let graph = Graph::parse_rdf_xml(document, uri)?;
        let subject = provider_subject(&graph, uri);
        let resource = project(&graph, &subject)?.into_resource();

        let capability_key = local_name(&domain.query_capability_predicate);
        let service_key = OSLC.term("service");
        let query_capabilities = resource
            .values(local_name(&service_key))
            .iter()
            .filter_map(PropertyValue::as_resource)
            .flat_map(|service| service.values(capability_key))
            .filter_map(PropertyValue::as_resource)
            .map(QueryCapability::from_resource)
            .collect();

        Ok(Self {
            uri: uri.to_string(),
            resource,
            query_capabilities,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn query_capabilities(&self) -> &[QueryCapability] {
        &self.query_capabilities
    }

    /// Query base of the first capability whose resource types match
    /// `resource_type_pattern`. The pattern is a regex; one that does not
    /// compile is matched as plain text.
    pub fn query_base_for(&self, resource_type_pattern: &str) -> Result<&str> {
        let matcher = match Regex::new(resource_type_pattern) {
            Ok(re) => re,
            Err(_) => Regex::new(&regex::escape(resource_type_pattern)).map_err(|e| {
                OslcError::ConfigError {
                    message: format!("Unusable resource type pattern: {}", e),
                }
            })?,
        };

        let queryable: Vec<&QueryCapability> = self
            .query_capabilities
            .iter()
            .filter(|qc| qc.has_query_base())
            .collect();
        if queryable.is_empty() {
            return Err(OslcError::QueryCapabilityNotFound {
                provider: self.uri.clone(),
            });
        }

        queryable
            .into_iter()
            .find(|qc| qc.resource_types.iter().any(|rt| matcher.is_match(rt)))
            .and_then(|qc| qc.query_base.as_deref())
            .ok_or_else(|| OslcError::NoMatchingResourceType {
                provider: self.uri.clone(),
                pattern: resource_type_pattern.to_string(),
            })
    }
}

/// The provider's own node; falls back to the first `oslc:ServiceProvider`
/// when the document describes itself under another URI.
fn provider_subject(graph: &Graph, uri: &str) -> Node {
    let requested = Node::named(uri);
    if graph.has_statements(&requested) {
        return requested;
    }
    let rdf_type = RDF.term("type");
    let provider_type = Term::named(OSLC.term("ServiceProvider"));
    graph
        .statements_matching(None, Some(rdf_type.as_str()), Some(&provider_type))
        .first()
        .map(|st| st.subject.clone())
        .unwrap_or(requested)
}
