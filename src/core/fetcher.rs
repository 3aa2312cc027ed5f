//! GET with transparent Jazz form login.
//!
//! A protected resource answers with the `X-com-ibm-team-repository-web-auth-msg:
//! authrequired` header. The fetcher then POSTs the credentials to
//! `<server>/j_security_check` and retries, at most `max_login_attempts` times.

use crate::core::root_services::append_segment;
use crate::domain::ports::{HttpResponse, Transport};
use crate::utils::error::{OslcError, Result};
use std::fmt;
use url::Url;

pub const AUTH_MSG_HEADER: &str = "X-com-ibm-team-repository-web-auth-msg";
pub const AUTH_REQUIRED: &str = "authrequired";
pub const LOGIN_PATH: &str = "j_security_check";
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 3;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    LoggingIn { attempt: u32 },
    Retrying { attempt: u32 },
    Authenticated,
    Failed,
}

/// `<server>/j_security_check?j_username=..&j_password=..`
pub fn login_url(server_uri: &Url, credentials: &Credentials) -> Result<Url> {
    let mut url = append_segment(server_uri, LOGIN_PATH)?;
    url.query_pairs_mut()
        .append_pair("j_username", &credentials.username)
        .append_pair("j_password", &credentials.password);
    Ok(url)
}

pub fn is_auth_challenge(response: &HttpResponse) -> bool {
    response.header(AUTH_MSG_HEADER) == Some(AUTH_REQUIRED)
}

/// Resets the session state if a fetch is dropped before it settles.
struct StateGuard<'a> {
    state: &'a mut AuthState,
    settled: bool,
}

impl<'a> StateGuard<'a> {
    fn new(state: &'a mut AuthState) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn set(&mut self, state: AuthState) {
        *self.state = state;
    }

    fn settle(mut self, state: AuthState) {
        *self.state = state;
        self.settled = true;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state = AuthState::Unauthenticated;
        }
    }
}

pub struct AuthenticatingFetcher<T: Transport> {
    transport: T,
    server_uri: Url,
    credentials: Option<Credentials>,
    max_login_attempts: u32,
    state: AuthState,
}

impl<T: Transport> AuthenticatingFetcher<T> {
    pub fn new(transport: T, server_uri: Url) -> Self {
        Self {
            transport,
            server_uri,
            credentials: None,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn with_max_login_attempts(mut self, attempts: u32) -> Self {
        self.max_login_attempts = attempts;
        self
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Forgets the credentials and the authentication state.
    pub fn clear(&mut self) {
        self.credentials = None;
        self.state = AuthState::Unauthenticated;
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn server_uri(&self) -> &Url {
        &self.server_uri
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GETs `url`, logging in whenever the server challenges.
    pub async fn get(&mut self, url: &Url) -> Result<HttpResponse> {
        let login_target = match &self.credentials {
            Some(credentials) => Some(login_url(&self.server_uri, credentials)?),
            None => None,
        };
        let max_attempts = self.max_login_attempts;
        let transport = &self.transport;
        let prior = self.state;
        let mut guard = StateGuard::new(&mut self.state);
        let mut attempt = 0;

        loop {
            let response = match transport.get(url).await {
                Ok(response) => response,
                Err(e) => {
                    guard.settle(prior);
                    return Err(e);
                }
            };
            let authenticated = attempt > 0 || prior == AuthState::Authenticated;

            if !is_auth_challenge(&response) {
                if response.is_ok() {
                    guard.settle(if authenticated {
                        AuthState::Authenticated
                    } else {
                        AuthState::Unauthenticated
                    });
                    return Ok(response);
                }
                guard.settle(if authenticated { AuthState::Authenticated } else { prior });
                return Err(OslcError::HttpStatusError {
                    url: url.to_string(),
                    status: response.status,
                });
            }

            let target = match &login_target {
                Some(target) if attempt < max_attempts => target,
                Some(_) => {
                    tracing::error!("🔐 Still challenged for {} after {} logins", url, attempt);
                    guard.settle(AuthState::Failed);
                    return Err(OslcError::AuthenticationError {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                None => {
                    tracing::warn!("🔐 {} requires a login but no credentials are set", url);
                    guard.settle(AuthState::Failed);
                    return Err(OslcError::AuthenticationError {
                        url: url.to_string(),
                        attempts: 0,
                    });
                }
            };

            attempt += 1;
            guard.set(AuthState::LoggingIn { attempt });
            tracing::info!("🔐 Form login challenge, attempt {}/{}", attempt, max_attempts);

            let login_response = match transport.post(target).await {
                Ok(response) => response,
                Err(e) => {
                    guard.settle(prior);
                    return Err(e);
                }
            };
            tracing::debug!("Login POST returned {}", login_response.status);
            guard.set(AuthState::Retrying { attempt });
        }
    }
}
