//! # API Client
//!
//! Thin wrapper around [`reqwest::Client`] that resolves endpoints against the
//! configured base URL, routes every request through the authorizer and maps
//! non-success responses onto [`ClientError`].

use std::{sync::Arc, time::Duration};

use metrics::counter;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

use crate::auth::{CredentialStore, authorize_request};
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::telemetry::{self, TraceContext};

const USER_AGENT: &str = concat!("booknet/", env!("CARGO_PKG_VERSION"));

/// HTTP transport shared by every service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        credentials: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        Self::new(config.base_url()?, credentials, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Resolve `path` below the base URL, keeping the base path prefix and
    /// any query the base URL carries.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self
            .http
            .request(method, self.endpoint(path)?)
            .header("Accept", "application/json"))
    }

    /// Authorize and send a request, failing on non-success statuses.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = authorize_request(builder.build()?, self.credentials.as_ref())?;
        let context = telemetry::current_context();
        if let Some((name, value)) = context.as_ref().and_then(TraceContext::header) {
            request.headers_mut().insert(name, value);
        }

        let method = request.method().clone();
        let span = info_span!(
            "http_request",
            method = %method,
            path = %request.url().path(),
            command = context.as_ref().map(|c| c.command).unwrap_or("-"),
            trace_id = context.as_ref().map(|c| c.trace_id.as_str()).unwrap_or("-"),
        );

        async move {
            let response = match self.http.execute(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, "Request could not be delivered");
                    record(&method, "network_error");
                    return Err(err.into());
                }
            };

            let status = response.status();
            if status.is_success() {
                debug!(status = status.as_u16(), "Request succeeded");
                record(&method, "success");
                return Ok(response);
            }

            let body = response.text().await.ok().filter(|b| !b.is_empty());
            warn!(status = status.as_u16(), "Request rejected by server");
            record(&method, "rejected");
            Err(ClientError::from_status(status, body))
        }
        .instrument(span)
        .await
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose response body is ignored.
    pub async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.execute(builder).await.map(|_| ())
    }
}

fn record(method: &Method, outcome: &'static str) {
    counter!(
        "booknet_http_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
