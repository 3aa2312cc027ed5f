// Domain layer: protocol data, models and ports. No I/O here.

pub mod domain_table;
pub mod model;
pub mod namespace;
pub mod ports;
