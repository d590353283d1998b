//! Blocking HTTP transport with Digest authentication

use pm_client_api::{Credentials, Transport, TransportError, TransportResult};
use pm_rest_api_contract::{ApiDocument, HttpMethod, PreparedRequest};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};

use crate::auth::DigestChallenge;
use crate::config::ClientConfig;
use crate::error::{RestClientError, RestClientResult};

/// [`Transport`] backed by `reqwest::blocking`.
///
/// Each request is first sent without credentials; a `401` carrying a Digest
/// challenge is answered once. A second `401` is reported as
/// [`TransportError::AuthenticationRejected`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RestClientError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { http_client })
    }

    fn dispatch(
        &self,
        request: &PreparedRequest,
        body: Option<&[u8]>,
        authorization: Option<&str>,
    ) -> TransportResult<Response> {
        let mut builder = self
            .http_client
            .request(to_reqwest_method(request.method), request.url.clone())
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.to_vec());
        }
        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        builder.send().map_err(map_reqwest_error)
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &PreparedRequest, credentials: &Credentials) -> TransportResult<ApiDocument> {
        let body = request.body.as_ref().map(serde_json::to_vec).transpose()?;
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let mut response = self.dispatch(request, body.as_deref(), None)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = digest_challenge(&response)
                .ok_or(TransportError::AuthenticationRejected { status: 401 })?;
            let challenge = DigestChallenge::parse(&challenge)?;
            let authorization = challenge.authorization(
                credentials,
                request.method.as_str(),
                &request.request_target(),
                body.as_deref().unwrap_or_default(),
            );

            tracing::trace!(realm = %challenge.realm, "answering digest challenge");
            response = self.dispatch(request, body.as_deref(), Some(&authorization))?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(TransportError::AuthenticationRejected { status: 401 });
            }
        }

        decode(response)
    }
}

fn digest_challenge(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.trim_start().to_ascii_lowercase().starts_with("digest"))
        .map(str::to_owned)
}

/// Decode any JSON body regardless of status. An empty body becomes `null`.
fn decode(response: Response) -> TransportResult<ApiDocument> {
    let status = response.status();
    let bytes = response.bytes().map_err(map_reqwest_error)?;
    tracing::debug!(status = status.as_u16(), length = bytes.len(), "received response");

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiDocument::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        TransportError::Decode(format!("HTTP {} response: {e}", status.as_u16()))
    })
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
