//! One OSLC session: discovery chain, container selection and queries.
//!
//! Every operation takes `&mut self`, so a session is used by one task at a
//! time. Independent sessions share nothing and may run concurrently.

use crate::adapters::http::ReqwestTransport;
use crate::core::catalog::ServiceProviderCatalog;
use crate::core::fetcher::{AuthState, AuthenticatingFetcher, Credentials};
use crate::core::query;
use crate::core::root_services::{root_services_url, RootServices};
use crate::core::service_provider::ServiceProvider;
use crate::domain::domain_table::{Domain, DomainTable};
use crate::domain::model::{QueryOptions, Resource};
use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::{OslcError, Result};
use crate::utils::validation::validate_url;
use url::Url;

pub struct OslcClient<T: Transport> {
    domain: Domain,
    fetcher: AuthenticatingFetcher<T>,
    catalog: Option<ServiceProviderCatalog>,
    provider: Option<ServiceProvider>,
}

impl OslcClient<ReqwestTransport> {
    /// Session over a reqwest transport built from `config`. The configured
    /// domain must be registered in `table`.
    pub fn from_config<C: ConfigProvider>(config: &C, table: &DomainTable) -> Result<Self> {
        validate_url("server.uri", config.server_uri())?;
        let server_uri = Url::parse(config.server_uri())?;
        let domain = table.resolve(config.domain())?.clone();
        let transport = ReqwestTransport::from_config(config)?;

        Ok(Self::new(server_uri, domain, transport).with_max_login_attempts(config.max_login_attempts()))
    }
}

impl<T: Transport> OslcClient<T> {
    pub fn new(server_uri: Url, domain: Domain, transport: T) -> Self {
        Self {
            domain,
            fetcher: AuthenticatingFetcher::new(transport, server_uri),
            catalog: None,
            provider: None,
        }
    }

    pub fn with_max_login_attempts(mut self, attempts: u32) -> Self {
        self.fetcher = self.fetcher.with_max_login_attempts(attempts);
        self
    }

    /// Resolves and fetches the domain's service provider catalog.
    pub async fn connect(&mut self, credentials: Option<Credentials>) -> Result<()> {
        if let Some(credentials) = credentials {
            self.fetcher.set_credentials(credentials);
        }
        self.catalog = None;
        self.provider = None;

        let root_url = root_services_url(self.fetcher.server_uri())?;
        tracing::info!("🚀 Connecting to {} ({})", self.fetcher.server_uri(), self.domain.alias);

        let response = self.fetcher.get(&root_url).await?;
        let root = RootServices::parse(response.url.as_str(), &response.body)?;
        let entry = root
            .catalog_entry(&self.domain)
            .ok_or_else(|| OslcError::NotFound {
                what: "Service provider catalog",
                detail: format!("no catalog for {} in {}", self.domain.uri(), root.uri()),
            })?;
        tracing::info!("📚 Catalog for {}: {}", self.domain.alias, entry.uri);

        let catalog_url = Url::parse(&entry.uri)?;
        let response = self.fetcher.get(&catalog_url).await?;
        if response.url != catalog_url {
            tracing::debug!("Catalog redirected to {}", response.url);
        }
        self.catalog = Some(ServiceProviderCatalog::parse(response.url.as_str(), &response.body)?);

        tracing::info!("✅ Connected");
        Ok(())
    }

    /// Selects the container whose title contains `container_title` and loads
    /// its service provider.
    pub async fn use_service_provider(&mut self, container_title: &str) -> Result<&ServiceProvider> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or(OslcError::NotConnected { step: "connect" })?;
        let provider_uri =
            catalog
                .find_service_provider(container_title)
                .ok_or_else(|| OslcError::NotFound {
                    what: "Service provider",
                    detail: format!("no container titled '{}' in {}", container_title, catalog.uri()),
                })?;
        tracing::info!("📦 Container '{}' is {}", container_title, provider_uri);

        self.provider = None;
        let provider = ServiceProvider::load(&provider_uri, &self.domain, &mut self.fetcher).await?;
        Ok(&*self.provider.insert(provider))
    }

    /// Queries the first capability whose resource types match
    /// `resource_type`.
    pub async fn query(&mut self, resource_type: &str, options: &QueryOptions) -> Result<Vec<Resource>> {
        let provider = self.provider.as_ref().ok_or(OslcError::NotConnected {
            step: "use_service_provider",
        })?;
        let query_base = Url::parse(provider.query_base_for(resource_type)?)?;
        tracing::debug!("Query base for '{}': {}", resource_type, query_base);

        query::execute(&mut self.fetcher, &query_base, options).await
    }

    /// The resource whose `dcterms:identifier` equals `identifier`.
    pub async fn read(&mut self, resource_type: &str, identifier: &str) -> Result<Option<Resource>> {
        let options = query::read_options(identifier);
        let found = self.query(resource_type, &options).await?.into_iter().next();
        if found.is_none() {
            tracing::warn!("No {} with identifier {}", resource_type, identifier);
        }
        Ok(found)
    }

    /// Drops the discovered documents and forgets the credentials.
    pub fn disconnect(&mut self) {
        self.catalog = None;
        self.provider = None;
        self.fetcher.clear();
        tracing::info!("👋 Disconnected from {}", self.fetcher.server_uri());
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn server_uri(&self) -> &Url {
        self.fetcher.server_uri()
    }

    pub fn catalog(&self) -> Option<&ServiceProviderCatalog> {
        self.catalog.as_ref()
    }

    pub fn service_provider(&self) -> Option<&ServiceProvider> {
        self.provider.as_ref()
    }

    pub fn auth_state(&self) -> AuthState {
        self.fetcher.state()
    }

    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }
}

/// Credentials from `config`, when both parts are present.
pub fn credentials_from_config<C: ConfigProvider>(config: &C) -> Option<Credentials> {
    match (config.username(), config.password()) {
        (Some(username), Some(password)) => Some(Credentials::new(username, password)),
        _ => None,
    }
}
