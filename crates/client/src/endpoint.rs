//! Real-time endpoint derivation from the configured API origin.

use url::Url;

use crate::types::ClientError;

/// Path of the chat socket on the API host.
pub const SOCKET_PATH: &str = "/ws";

/// Build `<ws|wss>://<host>/ws?session_id=<id>` from the API base.
///
/// The socket scheme mirrors the origin's security level.  Any path,
/// query or fragment on the base is discarded.
pub fn socket_url(api_base: &str, session_id: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidApiBase {
        base: api_base.to_owned(),
        reason,
    };

    let base = Url::parse(api_base.trim()).map_err(|e| invalid(e.to_string()))?;
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    };
    let host = base
        .host_str()
        .ok_or_else(|| invalid("missing host".into()))?;

    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };

    let mut url = Url::parse(&format!("{scheme}://{authority}{SOCKET_PATH}"))
        .map_err(|e| invalid(e.to_string()))?;
    url.query_pairs_mut().append_pair("session_id", session_id);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_origin_maps_to_wss() {
        let url = socket_url("https://chat.example.com", "s1").unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.com/ws?session_id=s1");
    }

    #[test]
    fn http_origin_maps_to_ws_and_keeps_port() {
        let url = socket_url("http://localhost:8000/", "s1").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws?session_id=s1");
    }

    #[test]
    fn path_query_and_fragment_are_dropped() {
        let url = socket_url("https://example.com/widget/v2?x=1#top", "s1").unwrap();
        assert_eq!(url.as_str(), "wss://example.com/ws?session_id=s1");
    }

    #[test]
    fn session_id_is_escaped() {
        let url = socket_url("http://h", "a b&c=d/é").unwrap();
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "session_id");
        assert_eq!(value, "a b&c=d/é");
        assert!(!url.as_str().contains("a b"));
        assert!(!url.as_str().contains("&c=d"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let err = socket_url("ftp://example.com", "s1").unwrap_err();
        assert!(matches!(err, ClientError::InvalidApiBase { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(socket_url("not a url", "s1").is_err());
    }
}
