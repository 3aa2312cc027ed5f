use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A projected property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Literal(String),
    /// A node with no statements of its own, kept as its URI.
    Reference(String),
    /// Shared when the same subject is reached along several paths.
    Resource(Arc<Resource>),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Literal text or reference URI.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Literal(s) | PropertyValue::Reference(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            PropertyValue::Resource(r) => Some(r.as_ref()),
            _ => None,
        }
    }

    /// Every value, whether the property was single or multi-valued.
    pub fn values(&self) -> &[PropertyValue] {
        match self {
            PropertyValue::List(items) => items,
            single => std::slice::from_ref(single),
        }
    }
}

/// A generic property bag for one linked-data subject.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Resource {
    #[serde(rename = "@id")]
    uri: String,
    #[serde(flatten)]
    properties: IndexMap<String, PropertyValue>,
}

impl Resource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Adds a value; a key seen before becomes a list in arrival order.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        match self.properties.get_mut(&key) {
            Some(PropertyValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, PropertyValue::List(Vec::with_capacity(2)));
                *existing = PropertyValue::List(vec![first, value]);
            }
            None => {
                self.properties.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_str)
    }

    /// All values for `key`; empty when absent.
    pub fn values(&self, key: &str) -> &[PropertyValue] {
        self.get(key).map(PropertyValue::values).unwrap_or(&[])
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A query endpoint declared by a service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCapability {
    pub title: Option<String>,
    pub resource_types: Vec<String>,
    pub query_base: Option<String>,
}

impl QueryCapability {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            title: resource.get_str("title").map(str::to_string),
            resource_types: resource
                .values("resourceType")
                .iter()
                .filter_map(PropertyValue::as_str)
                .map(str::to_string)
                .collect(),
            query_base: resource.get_str("queryBase").map(str::to_string),
        }
    }

    pub fn has_query_base(&self) -> bool {
        !self.resource_types.is_empty() && self.query_base.is_some()
    }
}

/// OSLC query parameters; empty fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub prefixes: String,
    pub select: String,
    #[serde(rename = "where")]
    pub where_clause: String,
    pub order_by: String,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefixes(mut self, prefixes: impl Into<String>) -> Self {
        self.prefixes = prefixes.into();
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    pub fn where_clause(mut self, where_clause: impl Into<String>) -> Self {
        self.where_clause = where_clause.into();
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// `(parameter, value)` pairs for the non-empty options, in protocol order.
    pub fn parameters(&self) -> Vec<(&'static str, &str)> {
        [
            ("oslc.prefix", self.prefixes.as_str()),
            ("oslc.select", self.select.as_str()),
            ("oslc.where", self.where_clause.as_str()),
            ("oslc.orderBy", self.order_by.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}
