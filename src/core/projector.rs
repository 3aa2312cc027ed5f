//! Flattens the subgraph under one subject into a [`Resource`] property bag.

use crate::adapters::graph::{Graph, Node, Term};
use crate::domain::model::{PropertyValue, Resource};
use crate::utils::error::{OslcError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Resource(Resource),
    /// The subject has no statements in this graph.
    Reference(String),
}

impl Projection {
    /// The projected bag, or an empty one carrying just the reference URI.
    pub fn into_resource(self) -> Resource {
        match self {
            Projection::Resource(resource) => resource,
            Projection::Reference(uri) => Resource::new(uri),
        }
    }
}

/// Text after the last `#` or `/` of a predicate IRI.
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(['#', '/']) {
        Some(index) => &iri[index + 1..],
        None => iri,
    }
}

pub fn project(graph: &Graph, subject: &Node) -> Result<Projection> {
    let mut active = HashSet::new();
    let mut finished = HashMap::new();
    let projected = project_node(graph, subject, &mut active, &mut finished)?;
    drop(finished);

    Ok(match projected {
        Some(resource) => {
            Projection::Resource(Arc::try_unwrap(resource).unwrap_or_else(|shared| (*shared).clone()))
        }
        None => Projection::Reference(subject.to_string()),
    })
}

/// `None` when the subject has no statements. A subject reached again on
/// another branch shares the bag built the first time.
fn project_node<'g>(
    graph: &'g Graph,
    subject: &'g Node,
    active: &mut HashSet<&'g Node>,
    finished: &mut HashMap<&'g Node, Arc<Resource>>,
) -> Result<Option<Arc<Resource>>> {
    if !graph.has_statements(subject) {
        return Ok(None);
    }
    if let Some(resource) = finished.get(subject) {
        return Ok(Some(Arc::clone(resource)));
    }
    if !active.insert(subject) {
        return Err(OslcError::CyclicGraphError {
            subject: subject.to_string(),
        });
    }

    let mut resource = Resource::new(subject.to_string());
    for statement in graph.statements_about(subject) {
        let value = match &statement.object {
            Term::Literal(literal) => PropertyValue::Literal(literal.value.clone()),
            Term::Node(node) => match project_node(graph, node, active, finished)? {
                Some(nested) => PropertyValue::Resource(nested),
                None => PropertyValue::Reference(node.to_string()),
            },
        };
        resource.insert(local_name(&statement.predicate), value);
    }

    active.remove(subject);
    let resource = Arc::new(resource);
    finished.insert(subject, Arc::clone(&resource));
    Ok(Some(resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::{Duration, Instant};

    const DCTERMS: &str = "http://purl.org/dc/terms/";
    const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    fn node(iri: &str) -> Node {
        Node::named(iri)
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("http://purl.org/dc/terms/title"), "title");
        assert_eq!(local_name("http://open-services.net/ns/core#queryBase"), "queryBase");
        assert_eq!(local_name("urn:nothing"), "urn:nothing");
        assert_eq!(local_name("http://example.com/trailing/"), "");
    }

    #[test]
    fn test_literals_become_scalar_values() {
        let mut graph = Graph::new();
        let req = node("http://example.com/req/3");
        graph.insert(req.clone(), format!("{}identifier", DCTERMS), Term::literal("3"));
        graph.insert(req.clone(), format!("{}title", DCTERMS), Term::literal("Login page"));

        let resource = project(&graph, &req).unwrap().into_resource();
        assert_eq!(resource.uri(), "http://example.com/req/3");
        assert_eq!(resource.get_str("identifier"), Some("3"));
        assert_eq!(resource.get_str("title"), Some("Login page"));
    }

    #[test]
    fn test_repeated_predicate_folds_in_statement_order() {
        let mut graph = Graph::new();
        let req = node("http://example.com/req/3");
        graph.insert(req.clone(), format!("{}subject", DCTERMS), Term::literal("security"));
        graph.insert(req.clone(), format!("{}subject", DCTERMS), Term::literal("ui"));

        let resource = project(&graph, &req).unwrap().into_resource();
        match resource.get("subject") {
            Some(PropertyValue::List(items)) => {
                let values: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                assert_eq!(values, vec!["security", "ui"]);
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_restated_literal_stays_scalar() {
        let document = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/">
  <rdf:Description rdf:about="http://example.com/r/1">
    <dcterms:title>A</dcterms:title>
  </rdf:Description>
  <rdf:Description rdf:about="http://example.com/r/1">
    <dcterms:title>A</dcterms:title>
  </rdf:Description>
</rdf:RDF>"#;
        let graph = Graph::parse_rdf_xml(document, "http://example.com/r/1").unwrap();

        let resource = project(&graph, &node("http://example.com/r/1")).unwrap().into_resource();
        assert_eq!(resource.get_str("title"), Some("A"));
    }

    #[test]
    fn test_dangling_object_degrades_to_uri() {
        let mut graph = Graph::new();
        let req = node("http://example.com/req/3");
        graph.insert(req.clone(), RDF_TYPE, Term::named("http://open-services.net/ns/rm#Requirement"));

        let resource = project(&graph, &req).unwrap().into_resource();
        assert_eq!(
            resource.get("type"),
            Some(&PropertyValue::Reference("http://open-services.net/ns/rm#Requirement".to_string()))
        );
    }

    #[test]
    fn test_nested_blank_node_is_projected() {
        let mut graph = Graph::new();
        let provider = node("http://example.com/sp");
        let service = Node::blank("s0");
        let qc = Node::blank("q0");
        graph.insert(provider.clone(), "http://open-services.net/ns/core#service", Term::Node(service.clone()));
        graph.insert(service.clone(), "http://open-services.net/ns/core#queryCapability", Term::Node(qc.clone()));
        graph.insert(qc.clone(), "http://open-services.net/ns/core#queryBase", Term::named("http://example.com/q"));

        let resource = project(&graph, &provider).unwrap().into_resource();
        let service = resource.get("service").and_then(PropertyValue::as_resource).unwrap();
        let qc = service.get("queryCapability").and_then(PropertyValue::as_resource).unwrap();
        assert_eq!(qc.uri(), "_:q0");
        assert_eq!(qc.get_str("queryBase"), Some("http://example.com/q"));
    }

    #[test]
    fn test_subject_without_statements_is_reference() {
        let graph = Graph::new();
        let projection = project(&graph, &node("http://example.com/elsewhere")).unwrap();
        assert_eq!(projection, Projection::Reference("http://example.com/elsewhere".to_string()));
        assert!(projection.into_resource().is_empty());
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let mut graph = Graph::new();
        let req = node("http://example.com/req/3");
        graph.insert(req.clone(), format!("{}title", DCTERMS), Term::literal("Loop"));
        graph.insert(req.clone(), format!("{}relation", DCTERMS), Term::Node(req.clone()));

        let err = project(&graph, &req).unwrap_err();
        assert!(matches!(err, OslcError::CyclicGraphError { subject } if subject == "http://example.com/req/3"));
    }

    #[test]
    fn test_indirect_cycle_is_detected() {
        let mut graph = Graph::new();
        let a = node("http://example.com/a");
        let b = node("http://example.com/b");
        graph.insert(a.clone(), format!("{}relation", DCTERMS), Term::Node(b.clone()));
        graph.insert(b.clone(), format!("{}relation", DCTERMS), Term::Node(a.clone()));

        assert!(matches!(project(&graph, &a), Err(OslcError::CyclicGraphError { .. })));
    }

    #[test]
    fn test_shared_node_on_two_branches_is_not_a_cycle() {
        let mut graph = Graph::new();
        let root = node("http://example.com/root");
        let shared = node("http://example.com/shared");
        graph.insert(root.clone(), format!("{}creator", DCTERMS), Term::Node(shared.clone()));
        graph.insert(root.clone(), format!("{}contributor", DCTERMS), Term::Node(shared.clone()));
        graph.insert(shared.clone(), format!("{}title", DCTERMS), Term::literal("Pat"));

        let resource = project(&graph, &root).unwrap().into_resource();
        assert!(resource.get("creator").and_then(PropertyValue::as_resource).is_some());
        assert!(resource.get("contributor").and_then(PropertyValue::as_resource).is_some());
    }

    #[test]
    fn test_deep_diamond_projects_each_subject_once() {
        let depth = 40;
        let mut graph = Graph::new();
        for i in 0..depth {
            let from = node(&format!("http://example.com/n{}", i));
            let to = Term::named(format!("http://example.com/n{}", i + 1));
            graph.insert(from.clone(), "http://example.com/a", to.clone());
            graph.insert(from, "http://example.com/b", to);
        }
        graph.insert(
            node(&format!("http://example.com/n{}", depth)),
            format!("{}title", DCTERMS),
            Term::literal("bottom"),
        );

        let started = Instant::now();
        let resource = project(&graph, &node("http://example.com/n0")).unwrap().into_resource();
        assert!(started.elapsed() < Duration::from_secs(2));

        let mut current = &resource;
        for _ in 0..depth {
            let a = current.get("a").and_then(PropertyValue::as_resource).unwrap();
            let b = current.get("b").and_then(PropertyValue::as_resource).unwrap();
            assert_eq!(a.uri(), b.uri());
            current = a;
        }
        assert_eq!(current.get_str("title"), Some("bottom"));
    }

    #[test]
    fn test_literal_set_independent_of_statement_order() {
        let req = node("http://example.com/req/3");
        let statements = [
            ("identifier", "3"),
            ("title", "Login page"),
            ("description", "Users can log in"),
        ];

        let mut forward = Graph::new();
        for (key, value) in statements.iter() {
            forward.insert(req.clone(), format!("{}{}", DCTERMS, key), Term::literal(*value));
        }
        let mut backward = Graph::new();
        for (key, value) in statements.iter().rev() {
            backward.insert(req.clone(), format!("{}{}", DCTERMS, key), Term::literal(*value));
        }

        let flatten = |graph: &Graph| -> BTreeMap<String, String> {
            project(graph, &req)
                .unwrap()
                .into_resource()
                .properties()
                .map(|(k, v)| (k.to_string(), v.as_str().unwrap_or_default().to_string()))
                .collect()
        };

        let expected: BTreeMap<String, String> = statements
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(flatten(&forward), expected);
        assert_eq!(flatten(&backward), expected);
    }
}
