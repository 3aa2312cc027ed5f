use crate::domain::ports::{ConfigProvider, HttpResponse, Transport};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use url::Url;

pub const RDF_XML: &str = "application/rdf+xml";
pub const OSLC_CORE_VERSION_HEADER: &str = "oslc-core-version";
pub const OSLC_CORE_VERSION: &str = "2.0";

/// reqwest client with the OSLC content negotiation headers, redirect
/// following and a cookie store scoped to this value.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::build(None, false)
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::build(config.request_timeout(), config.accept_invalid_certs())
    }

    fn build(timeout: Option<Duration>, accept_invalid_certs: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(RDF_XML));
        headers.insert(
            HeaderName::from_static(OSLC_CORE_VERSION_HEADER),
            HeaderValue::from_static(OSLC_CORE_VERSION),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .redirect(redirect::Policy::limited(10))
            .danger_accept_invalid_certs(accept_invalid_certs);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn read_response(response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("GET {} -> {}", url, response.status());
        Self::read_response(response).await
    }

    async fn post(&self, url: &Url) -> Result<HttpResponse> {
        tracing::debug!("POST {}", url.path());
        let response = self.client.post(url.clone()).send().await?;
        tracing::debug!("POST {} -> {}", url.path(), response.status());
        Self::read_response(response).await
    }
}
