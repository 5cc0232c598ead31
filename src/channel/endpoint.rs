//! Endpoint derivation from the page location.

use url::Url;

use super::ChannelError;

/// Well-known route of the live connection.
pub const DEFAULT_ROUTE: &str = "/live-view";

/// Compute the socket endpoint for a page.
///
/// - `http` → `ws`, `https` → `wss` (`ws`/`wss` pass through)
/// - path replaced with `route`
/// - host, port and query kept; fragment dropped
pub fn derive_endpoint(page: &Url, route: &str) -> Result<Url, ChannelError> {
    let scheme = match page.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::UnsupportedScheme(other.to_string())),
    };

    let mut endpoint = page.clone();
    endpoint
        .set_scheme(scheme)
        .map_err(|()| ChannelError::UnsupportedScheme(page.scheme().to_string()))?;

    if route.starts_with('/') {
        endpoint.set_path(route);
    } else {
        endpoint.set_path(&format!("/{route}"));
    }
    endpoint.set_fragment(None);
    Ok(endpoint)
}
