pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::ReqwestTransport;
pub use core::client::{credentials_from_config, OslcClient};
pub use core::fetcher::{AuthState, Credentials};
pub use domain::domain_table::{Domain, DomainTable};
pub use domain::model::{PropertyValue, QueryOptions, Resource};
pub use utils::error::{OslcError, Result};
