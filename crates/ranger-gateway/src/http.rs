//! `PolicyGateway` over HTTP, using a blocking `reqwest` client.
//!
//! One method call issues one request. Status handling:
//!
//! | status        | result                      |
//! |---------------|-----------------------------|
//! | 200, 201      | decode body                 |
//! | 204 (delete)  | success, no body            |
//! | 404           | `NotFound`                  |
//! | anything else | `ApiError { status, body }` |

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use ranger_contracts::{
    error::{RangerError, RangerResult},
    wire::Policy,
};

use crate::config::GatewayConfig;
use crate::routes::PolicyRoutes;
use crate::traits::PolicyGateway;

const JSON: &str = "application/json";

/// A gateway talking to a live Ranger Admin instance.
///
/// The client is built once and reused for every call; nothing mutates it
/// after construction.
#[derive(Debug, Clone)]
pub struct HttpPolicyGateway {
    client: Client,
    routes: PolicyRoutes,
    auth_header: String,
}

impl HttpPolicyGateway {
    /// Build the HTTP client and authorization header from `config`.
    pub fn from_config(config: &GatewayConfig) -> RangerResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout())
            .user_agent(concat!("rangersync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RangerError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Self::with_client(client, &config.endpoint, config.authorization_header())
    }

    /// Use a ready-made client, endpoint and authorization header.
    pub fn with_client(
        client: Client,
        endpoint: &str,
        auth_header: impl Into<String>,
    ) -> RangerResult<Self> {
        Ok(Self {
            client,
            routes: PolicyRoutes::new(endpoint)?,
            auth_header: auth_header.into(),
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "Ranger request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, JSON)
    }

    fn write_request(&self, method: Method, url: Url, policy: &Policy) -> RequestBuilder {
        self.request(method, url).json(policy)
    }
}

impl PolicyGateway for HttpPolicyGateway {
    fn get_policy(&self, id: i64) -> RangerResult<Policy> {
        let response = send(self.request(Method::GET, self.routes.policy(id)))?;
        decode(response, || format!("no policy with id {id}"))
    }

    fn find_policy(&self, service: &str, name: &str) -> RangerResult<Policy> {
        let url = self.routes.policy_search(service, name);
        let response = send(self.request(Method::GET, url))?;
        let candidates: Vec<Policy> =
            decode(response, || format!("no policies in service '{service}'"))?;

        debug!(
            service = %service,
            name = %name,
            candidates = candidates.len(),
            "filtering search results for exact name"
        );

        candidates
            .into_iter()
            .find(|policy| policy.name == name)
            .ok_or_else(|| RangerError::NotFound {
                what: format!("no policy named '{name}' in service '{service}'"),
            })
    }

    fn create_policy(&self, policy: &Policy) -> RangerResult<Policy> {
        let request = self.write_request(Method::POST, self.routes.policies(), policy);
        let response = send(request)?;
        decode(response, || "policy endpoint".to_string())
    }

    fn replace_policy(&self, id: i64, policy: &Policy) -> RangerResult<Policy> {
        let request = self.write_request(Method::PUT, self.routes.policy(id), policy);
        let response = send(request)?;
        decode(response, || format!("no policy with id {id}"))
    }

    fn delete_policy(&self, id: i64) -> RangerResult<()> {
        let response = send(self.request(Method::DELETE, self.routes.policy(id)))?;
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(status_error(response, || format!("no policy with id {id}"))),
        }
    }
}

fn send(request: RequestBuilder) -> RangerResult<Response> {
    request.send().map_err(|e| RangerError::ApiUnreachable {
        reason: error_chain(&e),
    })
}

/// Decode a 200/201 body as `T`; map every other status to an error.
fn decode<T: DeserializeOwned>(
    response: Response,
    what: impl FnOnce() -> String,
) -> RangerResult<T> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED => {
            response.json().map_err(|e| {
                if e.is_decode() {
                    RangerError::DecodeError {
                        reason: error_chain(&e),
                    }
                } else {
                    RangerError::ApiUnreachable {
                        reason: format!("failed reading response body: {}", error_chain(&e)),
                    }
                }
            })
        }
        _ => Err(status_error(response, what)),
    }
}

fn status_error(response: Response, what: impl FnOnce() -> String) -> RangerError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return RangerError::NotFound { what: what() };
    }
    let body = response.text().unwrap_or_default();
    RangerError::ApiError {
        status: status.as_u16(),
        body: if body.is_empty() {
            status.to_string()
        } else {
            body
        },
    }
}

/// reqwest's top-level message hides the cause (refused, DNS, TLS); walk the chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
