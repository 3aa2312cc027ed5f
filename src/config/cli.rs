use crate::config::toml_config::{CredentialsConfig, TomlConfig};
use crate::utils::error::Result;
use crate::utils::output::OutputFormat;
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "oslc-client")]
#[command(about = "Discover OSLC service providers and query their resources")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file; flags override its values")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "OSLC_SERVER", help = "Server base URI, e.g. https://host:9443/rm")]
    pub server: Option<String>,

    #[arg(long, help = "Domain alias (rm, cm, config) or namespace URI")]
    pub domain: Option<String>,

    #[arg(long, env = "OSLC_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "OSLC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, help = "Title (or part of it) of the project area")]
    pub container: Option<String>,

    #[arg(long, help = "Resource type pattern, e.g. Requirement")]
    pub resource_type: Option<String>,

    #[arg(long)]
    pub prefixes: Option<String>,

    #[arg(long)]
    pub select: Option<String>,

    #[arg(long = "where")]
    pub where_clause: Option<String>,

    #[arg(long)]
    pub order_by: Option<String>,

    #[arg(long, help = "Read one resource by dcterms:identifier")]
    pub read: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long)]
    pub max_login_attempts: Option<u32>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Accept self-signed server certificates")]
    pub insecure: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Layers the flags that were given over `base`.
    pub fn apply_to(&self, mut base: TomlConfig) -> TomlConfig {
        if let Some(server) = &self.server {
            base.server.uri = server.clone();
        }
        if let Some(domain) = &self.domain {
            base.server.domain = domain.clone();
        }
        if let Some(timeout) = self.timeout {
            base.server.timeout_seconds = Some(timeout);
        }
        if self.insecure {
            base.server.accept_invalid_certs = true;
        }
        if let Some(attempts) = self.max_login_attempts {
            base.auth.max_login_attempts = attempts;
        }

        if self.username.is_some() || self.password.is_some() {
            let credentials = base.credentials.get_or_insert_with(CredentialsConfig::default);
            if let Some(username) = &self.username {
                credentials.username = Some(username.clone());
            }
            if let Some(password) = &self.password {
                credentials.password = Some(password.clone());
            }
        }

        let query = &mut base.query;
        if let Some(container) = &self.container {
            query.container = Some(container.clone());
        }
        if let Some(resource_type) = &self.resource_type {
            query.resource_type = Some(resource_type.clone());
        }
        if let Some(read) = &self.read {
            query.read = Some(read.clone());
        }
        if let Some(prefixes) = &self.prefixes {
            query.options.prefixes = prefixes.clone();
        }
        if let Some(select) = &self.select {
            query.options.select = select.clone();
        }
        if let Some(where_clause) = &self.where_clause {
            query.options.where_clause = where_clause.clone();
        }
        if let Some(order_by) = &self.order_by {
            query.options.order_by = order_by.clone();
        }

        base
    }

    /// Loads `--config` when given and applies the flags on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let base = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        let resolved = self.apply_to(base);
        resolved.validate()?;
        Ok(resolved)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(container) = &self.container {
            validate_non_empty_string("container", container)?;
        }
        if let Some(read) = &self.read {
            validate_non_empty_string("read", read)?;
        }
        Ok(())
    }
}
