use thiserror::Error;

#[derive(Error, Debug)]
pub enum OslcError {
    #[error("Domain {namespace} is not registered in the domain table")]
    UnsupportedDomain { namespace: String },

    #[error("{what} not found: {detail}")]
    NotFound { what: &'static str, detail: String },

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Authentication for {url} still required after {attempts} login attempts")]
    AuthenticationError { url: String, attempts: u32 },

    #[error("Service provider {provider} exposes no query capability with a query base")]
    QueryCapabilityNotFound { provider: String },

    #[error("Service provider {provider} has no query capability for resource type '{pattern}'")]
    NoMatchingResourceType { provider: String, pattern: String },

    #[error("Cycle detected while projecting {subject}")]
    CyclicGraphError { subject: String },

    #[error("Failed to parse RDF/XML from {uri}: {message}")]
    GraphParseError { uri: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Session is not ready: {step} must succeed first")]
    NotConnected { step: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Discovery,
    Network,
    Authentication,
    Query,
    Document,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OslcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OslcError::UnsupportedDomain { .. }
            | OslcError::NotFound { .. }
            | OslcError::NotConnected { .. } => ErrorCategory::Discovery,
            OslcError::NetworkError(_) | OslcError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            OslcError::AuthenticationError { .. } => ErrorCategory::Authentication,
            OslcError::QueryCapabilityNotFound { .. }
            | OslcError::NoMatchingResourceType { .. } => ErrorCategory::Query,
            OslcError::CyclicGraphError { .. } | OslcError::GraphParseError { .. } => {
                ErrorCategory::Document
            }
            OslcError::InvalidUrl(_)
            | OslcError::ConfigError { .. }
            | OslcError::InvalidConfigValueError { .. }
            | OslcError::MissingConfigError { .. } => ErrorCategory::Configuration,
            OslcError::IoError(_) | OslcError::SerializationError(_) | OslcError::CsvError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 呼叫端可以換參數重試
            OslcError::NotFound { .. }
            | OslcError::QueryCapabilityNotFound { .. }
            | OslcError::NoMatchingResourceType { .. } => ErrorSeverity::Medium,
            OslcError::NetworkError(_) | OslcError::HttpStatusError { .. } => ErrorSeverity::Medium,
            OslcError::UnsupportedDomain { .. }
            | OslcError::AuthenticationError { .. }
            | OslcError::InvalidUrl(_)
            | OslcError::ConfigError { .. }
            | OslcError::InvalidConfigValueError { .. }
            | OslcError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether the failure came from the network layer and is worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OslcError::UnsupportedDomain { .. } => {
                "Use one of the registered domains: rm, cm or config".to_string()
            }
            OslcError::NotFound { what, .. } => {
                format!("Check that the {} exists and is visible to this user", what)
            }
            OslcError::NetworkError(_) | OslcError::HttpStatusError { .. } => {
                "Check the server URI and network connectivity, then try again".to_string()
            }
            OslcError::AuthenticationError { .. } => {
                "Check the username and password for this server".to_string()
            }
            OslcError::QueryCapabilityNotFound { .. } => {
                "This service provider does not support queries; try another container".to_string()
            }
            OslcError::NoMatchingResourceType { .. } => {
                "Try a different resource type, e.g. Requirement or ChangeRequest".to_string()
            }
            OslcError::CyclicGraphError { .. } | OslcError::GraphParseError { .. } => {
                "The server returned a document this client cannot project".to_string()
            }
            OslcError::NotConnected { step } => format!("Run {} before this operation", step),
            OslcError::InvalidUrl(_)
            | OslcError::ConfigError { .. }
            | OslcError::InvalidConfigValueError { .. }
            | OslcError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line arguments".to_string()
            }
            OslcError::IoError(_) | OslcError::SerializationError(_) | OslcError::CsvError(_) => {
                "Check that the output destination is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OslcError::AuthenticationError { .. } => "Login to the server failed".to_string(),
            OslcError::NetworkError(e) => format!("Could not reach the server: {}", e),
            OslcError::MissingConfigError { field } => format!("Please provide {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OslcError>;
