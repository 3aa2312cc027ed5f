use crate::domain::model::QueryOptions;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OslcError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub credentials: Option<CredentialsConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub uri: String,
    /// Alias (`rm`, `cm`, `config`) or namespace URI.
    #[serde(default = "default_domain")]
    pub domain: String,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            domain: default_domain(),
            timeout_seconds: None,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
        }
    }
}

/// What to query once connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    pub container: Option<String>,
    pub resource_type: Option<String>,
    /// Identifier to read instead of running a free query.
    pub read: Option<String>,
    #[serde(flatten)]
    pub options: QueryOptions,
}

fn default_domain() -> String {
    "rm".to_string()
}

fn default_max_login_attempts() -> u32 {
    crate::core::fetcher::DEFAULT_MAX_LOGIN_ATTEMPTS
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OslcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OslcError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OSLC_PASSWORD})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OslcError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("server.uri", &self.server.uri)?;
        validate_non_empty_string("server.domain", &self.server.domain)?;
        validate_range("auth.max_login_attempts", self.auth.max_login_attempts, 1, 10)?;

        if let Some(timeout) = self.server.timeout_seconds {
            validate_positive_number("server.timeout_seconds", timeout, 1)?;
        }

        if let Some(credentials) = &self.credentials {
            match (&credentials.username, &credentials.password) {
                (Some(_), None) => {
                    return Err(OslcError::MissingConfigError {
                        field: "credentials.password".to_string(),
                    })
                }
                (None, Some(_)) => {
                    return Err(OslcError::MissingConfigError {
                        field: "credentials.username".to_string(),
                    })
                }
                _ => {}
            }
        }

        if let Some(container) = &self.query.container {
            validate_non_empty_string("query.container", container)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn server_uri(&self) -> &str {
        &self.server.uri
    }

    fn domain(&self) -> &str {
        &self.server.domain
    }

    fn username(&self) -> Option<&str> {
        self.credentials.as_ref()?.username.as_deref()
    }

    fn password(&self) -> Option<&str> {
        self.credentials.as_ref()?.password.as_deref()
    }

    fn max_login_attempts(&self) -> u32 {
        self.auth.max_login_attempts
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.server.timeout_seconds.map(Duration::from_secs)
    }

    fn accept_invalid_certs(&self) -> bool {
        self.server.accept_invalid_certs
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
uri = "https://jazz.example.com:9443/rm"
domain = "rm"
timeout_seconds = 30
accept_invalid_certs = true

[credentials]
username = "patricia"
password = "patricia"

[auth]
max_login_attempts = 5

[query]
container = "Acme Project"
resource_type = "Requirement"
select = "dcterms:title,dcterms:identifier"
where = "dcterms:identifier=3"
prefixes = "dcterms=<http://purl.org/dc/terms/>"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server_uri(), "https://jazz.example.com:9443/rm");
        assert_eq!(config.username(), Some("patricia"));
        assert_eq!(config.max_login_attempts(), 5);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.accept_invalid_certs());
        assert_eq!(config.query.container.as_deref(), Some("Acme Project"));
        assert_eq!(config.query.options.where_clause, "dcterms:identifier=3");
        assert!(config.query.options.order_by.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[server]
uri = "https://jazz.example.com/ccm"
"#,
        )
        .unwrap();

        assert_eq!(config.domain(), "rm");
        assert_eq!(config.max_login_attempts(), 3);
        assert_eq!(config.username(), None);
        assert_eq!(config.request_timeout(), None);
        assert!(config.query.options.parameters().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OSLC_TEST_PASSWORD", "from-env");

        let toml_content = r#"
[server]
uri = "https://jazz.example.com/rm"

[credentials]
username = "patricia"
password = "${OSLC_TEST_PASSWORD}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.password(), Some("from-env"));

        std::env::remove_var("OSLC_TEST_PASSWORD");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let config = TomlConfig::from_toml_str(
            r#"
[server]
uri = "https://jazz.example.com/rm"
domain = "${OSLC_TEST_DOMAIN_NEVER_SET}"
"#,
        )
        .unwrap();
        assert_eq!(config.domain(), "${OSLC_TEST_DOMAIN_NEVER_SET}");
    }

    #[test]
    fn test_config_validation() {
        let invalid_uri = TomlConfig::from_toml_str("[server]\nuri = \"invalid-url\"\n").unwrap();
        assert!(invalid_uri.validate().is_err());

        let too_many_attempts = TomlConfig::from_toml_str(
            "[server]\nuri = \"https://jazz.example.com/rm\"\n[auth]\nmax_login_attempts = 0\n",
        )
        .unwrap();
        assert!(too_many_attempts.validate().is_err());

        let half_credentials = TomlConfig::from_toml_str(
            "[server]\nuri = \"https://jazz.example.com/rm\"\n[credentials]\nusername = \"patricia\"\n",
        )
        .unwrap();
        assert!(matches!(
            half_credentials.validate(),
            Err(OslcError::MissingConfigError { field }) if field == "credentials.password"
        ));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nuri = ").unwrap_err();
        assert!(matches!(err, OslcError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nuri = \"https://jazz.example.com/qm\"\ndomain = \"cm\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.domain(), "cm");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TomlConfig::from_file("/nonexistent/oslc.toml").unwrap_err();
        assert!(matches!(err, OslcError::IoError(_)));
    }
}
