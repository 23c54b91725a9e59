//! Transport URL construction: `<base>/<thread_id>/?token=<token>`.

use reqwest::Url;

use crate::domain::{ConnectionToken, ThreadId, TransportError};

/// Build the transport URL for one handshake.
///
/// Consumes the token. `http`/`https` bases are mapped to `ws`/`wss`.
pub fn build_transport_url(
    base: &str,
    thread_id: &ThreadId,
    token: ConnectionToken,
) -> Result<String, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        "ws" | "wss" => "",
        other => {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )));
        }
    };
    if !scheme.is_empty() && url.set_scheme(scheme).is_err() {
        return Err(TransportError::InvalidUrl(format!(
            "cannot switch scheme to '{}'",
            scheme
        )));
    }

    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUrl(format!("'{}' cannot be a base", base)))?
        .pop_if_empty()
        .push(thread_id.as_str())
        .push("");
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("token", &token.into_secret());

    Ok(url.into())
}
