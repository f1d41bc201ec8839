//! Request construction, dispatch, and error classification for the REST
//! backend.

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::ErrorBody;
use super::{REQUEST_ID_HEADER, RestClient};
use crate::backend::{RequestContext, TraceId};
use crate::error::{ApiError, ArrayError, ErrorScope};

fn transport_error(err: reqwest::Error) -> ArrayError {
    ArrayError::Transport {
        message: err.to_string(),
    }
}

fn trace_field(ctx: &RequestContext) -> Option<&str> {
    ctx.trace_id().map(TraceId::as_str)
}

/// Builds a classified error from a non-success response.
///
/// The first message in the array's error body supplies the message and
/// code; otherwise the raw body (or the status reason) is used.
pub(super) fn classify(status: u16, body: &[u8], scope: ErrorScope) -> ApiError {
    let parsed = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::primary);

    let raw = String::from_utf8_lossy(body).trim().to_owned();
    let fallback = if raw.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("unrecognised response")
            .to_owned()
    } else {
        raw
    };

    let (message, code) = match parsed {
        Some(entry) => (entry.message_l10n.unwrap_or(fallback), entry.code),
        None => (fallback, None),
    };

    ApiError::from_status(status, scope, message).with_code(code)
}

impl RestClient {
    /// Appends `segments` to the endpoint path, percent-encoding each one.
    pub(super) fn url(&self, segments: &[&str]) -> Result<Url, ArrayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ArrayError::Config(format!(
                    "endpoint {} cannot be used as a base URL",
                    self.base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn prepare(&self, ctx: &RequestContext, method: Method, url: Url) -> RequestBuilder {
        debug!(
            method = %method,
            path = url.path(),
            trace_id = trace_field(ctx),
            "sending request"
        );
        let timeout = ctx.timeout().unwrap_or_else(|| self.config.timeout());
        let mut builder = self
            .http
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(ACCEPT, "application/json")
            .timeout(timeout);
        if let Some(trace_id) = ctx.trace_id() {
            builder = builder.header(REQUEST_ID_HEADER, trace_id.as_str());
        }
        builder
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
        scope: ErrorScope,
    ) -> Result<Vec<u8>, ArrayError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        debug!(
            status = status.as_u16(),
            trace_id = trace_field(ctx),
            "received response"
        );

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let error = classify(status.as_u16(), &body, scope);
        warn!(
            status = error.status,
            kind = ?error.kind,
            resource = %error.resource,
            trace_id = trace_field(ctx),
            "array rejected request: {}",
            error.message
        );
        Err(ArrayError::Api(error))
    }

    /// Sends a request without a body.
    pub(super) async fn send(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: Url,
        scope: ErrorScope,
    ) -> Result<Vec<u8>, ArrayError> {
        let request = self.prepare(ctx, method, url);
        self.dispatch(ctx, request, scope).await
    }

    /// Sends a request with a JSON body.
    pub(super) async fn send_json<T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: Url,
        payload: &T,
        scope: ErrorScope,
    ) -> Result<Vec<u8>, ArrayError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let request = self.prepare(ctx, method, url).json(payload);
        self.dispatch(ctx, request, scope).await
    }

    /// Sends a request with query parameters.
    pub(super) async fn send_query(
        &self,
        ctx: &RequestContext,
        url: Url,
        query: &[(&str, String)],
        scope: ErrorScope,
    ) -> Result<Vec<u8>, ArrayError> {
        let request = self.prepare(ctx, Method::GET, url).query(query);
        self.dispatch(ctx, request, scope).await
    }
}

/// Parses a JSON response body.
pub(super) fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, ArrayError> {
    serde_json::from_slice(body).map_err(|err| ArrayError::Decode {
        what: what.to_owned(),
        message: err.to_string(),
    })
}
