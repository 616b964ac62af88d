//! Shared request plumbing for backend calls.

use crate::error::{CoreError, Result};
use crate::types::ApiMessage;
use bridge_traits::http::HttpResponse;
use url::Url;

/// Appends `segments` to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CoreError::InvalidInput(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Builds a `Backend` error from a response, preferring the server's
/// `message` or `error` field over the raw body.
pub(crate) fn backend_error(response: &HttpResponse) -> CoreError {
    let parsed = response.json::<ApiMessage>().unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .or_else(|| {
            response
                .text()
                .ok()
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_else(|| format!("HTTP {}", response.status));

    CoreError::Backend {
        status: response.status,
        message,
    }
}

/// Server-provided success message, if any.
pub(crate) fn success_message(response: &HttpResponse) -> Option<String> {
    response
        .json::<ApiMessage>()
        .ok()
        .and_then(|body| body.message)
}
