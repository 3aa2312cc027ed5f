pub mod catalog;
pub mod client;
pub mod fetcher;
pub mod projector;
pub mod query;
pub mod root_services;
pub mod service_provider;

pub use crate::domain::ports::{ConfigProvider, Transport};
pub use crate::utils::error::Result;
