use crate::adapters::graph::Graph;
use crate::core::fetcher::AuthenticatingFetcher;
use crate::core::projector::project;
use crate::domain::model::{QueryOptions, Resource};
use crate::domain::namespace::{Prefixes, DCTERMS, RDFS};
use crate::domain::ports::Transport;
use crate::utils::error::Result;
use url::Url;

/// Appends the non-empty options to `query_base`. Parameters already on the
/// base are kept; an all-empty option set returns the base unchanged.
pub fn build_query_url(query_base: &Url, options: &QueryOptions) -> Url {
    let mut url = query_base.clone();
    let parameters = options.parameters();
    if !parameters.is_empty() {
        url.query_pairs_mut().extend_pairs(parameters);
    }
    url
}

/// Options for fetching one resource by `dcterms:identifier`.
pub fn read_options(identifier: &str) -> QueryOptions {
    QueryOptions::new()
        .prefixes(Prefixes::new().with(DCTERMS).to_string())
        .select("*")
        .where_clause(format!("dcterms:identifier={}", identifier))
}

/// Every `rdfs:member` of the result set, projected in document order.
pub fn result_members(url: &str, document: &str) -> Result<Vec<Resource>> {
    let graph = Graph::parse_rdf_xml(document, url)?;
    let member = RDFS.term("member");

    graph
        .statements_matching(None, Some(member.as_str()), None)
        .into_iter()
        .filter_map(|st| st.object.as_node())
        .map(|node| project(&graph, node).map(|projection| projection.into_resource()))
        .collect()
}

pub async fn execute<T: Transport>(
    fetcher: &mut AuthenticatingFetcher<T>,
    query_base: &Url,
    options: &QueryOptions,
) -> Result<Vec<Resource>> {
    let url = build_query_url(query_base, options);
    tracing::debug!("Query URL: {}", url);

    let response = fetcher.get(&url).await?;
    let resources = result_members(response.url.as_str(), &response.body)?;

    tracing::info!("🔎 Query returned {} resources", resources.len());
    Ok(resources)
}
