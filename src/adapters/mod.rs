// Adapters layer: concrete implementations of the external collaborators
// (RDF/XML graph store, HTTP transport).

pub mod graph;
pub mod http;

pub use graph::{Graph, Literal, Node, Statement, Term};
pub use http::ReqwestTransport;
