use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// What the transport hands back for one request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP capability used by a session. Implementations keep their own cookie
/// jar so a form login carries over to later requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse>;
    async fn post(&self, url: &Url) -> Result<HttpResponse>;
}

pub trait ConfigProvider: Send + Sync {
    fn server_uri(&self) -> &str;
    fn domain(&self) -> &str;
    fn username(&self) -> Option<&str>;
    fn password(&self) -> Option<&str>;
    fn max_login_attempts(&self) -> u32;
    fn request_timeout(&self) -> Option<Duration>;
    fn accept_invalid_certs(&self) -> bool;
}
