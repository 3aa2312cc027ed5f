use crate::domain::namespace::{Namespace, JD, OSLC, OSLC_CM, OSLC_CONFIG, OSLC_RM};
use crate::utils::error::{OslcError, Result};
use crate::utils::validation::Validate;
use oxiri::Iri;
use std::collections::HashSet;

/// How a root document points at a domain's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogForm {
    /// The lookup predicate is itself domain specific; a candidate without any
    /// `oslc:domain` declaration is accepted.
    Direct,
    /// Generic catalog entries that must declare the requested `oslc:domain`.
    Declared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub alias: &'static str,
    pub namespace: Namespace,
    pub catalog_predicate: String,
    pub query_capability_predicate: String,
    pub catalog_form: CatalogForm,
}

impl Domain {
    pub fn uri(&self) -> &str {
        self.namespace.uri
    }
}

/// Closed table of the domains this client can resolve.
#[derive(Debug, Clone)]
pub struct DomainTable {
    domains: Vec<Domain>,
}

impl DomainTable {
    pub fn new(domains: Vec<Domain>) -> Result<Self> {
        let table = Self { domains };
        table.validate()?;
        Ok(table)
    }

    /// Requirements, change management and configuration management, as
    /// published in Jazz rootservices documents.
    pub fn standard() -> Self {
        Self {
            domains: vec![
                Domain {
                    alias: "rm",
                    namespace: OSLC_RM,
                    catalog_predicate: OSLC_RM.term("rmServiceProviders"),
                    query_capability_predicate: OSLC.term("queryCapability"),
                    catalog_form: CatalogForm::Direct,
                },
                Domain {
                    alias: "cm",
                    namespace: OSLC_CM,
                    catalog_predicate: JD.term("oslcCatalogs"),
                    query_capability_predicate: OSLC.term("queryCapability"),
                    catalog_form: CatalogForm::Declared,
                },
                Domain {
                    alias: "config",
                    namespace: OSLC_CONFIG,
                    catalog_predicate: OSLC_CONFIG.term("configServiceProviders"),
                    query_capability_predicate: OSLC.term("queryCapability"),
                    catalog_form: CatalogForm::Direct,
                },
            ],
        }
    }

    pub fn lookup(&self, namespace_uri: &str) -> Result<&Domain> {
        self.domains
            .iter()
            .find(|d| d.uri() == namespace_uri)
            .ok_or_else(|| OslcError::UnsupportedDomain {
                namespace: namespace_uri.to_string(),
            })
    }

    /// Accepts either a short alias (`rm`) or the full namespace URI.
    pub fn resolve(&self, name: &str) -> Result<&Domain> {
        match self.domains.iter().find(|d| d.alias == name) {
            Some(domain) => Ok(domain),
            None => self.lookup(name),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Domain> {
        self.domains.iter()
    }
}

impl Default for DomainTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl Validate for DomainTable {
    fn validate(&self) -> Result<()> {
        let mut aliases = HashSet::new();
        let mut namespaces = HashSet::new();

        for domain in &self.domains {
            if !aliases.insert(domain.alias) {
                return Err(OslcError::InvalidConfigValueError {
                    field: "domain.alias".to_string(),
                    value: domain.alias.to_string(),
                    reason: "Alias registered twice".to_string(),
                });
            }
            if !namespaces.insert(domain.uri()) {
                return Err(OslcError::InvalidConfigValueError {
                    field: "domain.namespace".to_string(),
                    value: domain.uri().to_string(),
                    reason: "Namespace registered twice".to_string(),
                });
            }
            for predicate in [&domain.catalog_predicate, &domain.query_capability_predicate] {
                Iri::parse(predicate.as_str()).map_err(|e| OslcError::InvalidConfigValueError {
                    field: format!("domain.{}", domain.alias),
                    value: predicate.clone(),
                    reason: format!("Predicate is not an absolute IRI: {}", e),
                })?;
            }
        }

        Ok(())
    }
}
