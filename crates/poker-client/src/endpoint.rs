//! Relay endpoint addressing.

use std::fmt;

use url::Url;

use crate::TransportError;

/// WebSocket scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain `ws://`, for local relays.
    Ws,
    /// TLS `wss://`.
    #[default]
    Wss,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        })
    }
}

/// A room on a relay host: `{scheme}://{host}/{room_id}`.
///
/// Two endpoints are the same connection target iff all fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Relay host, optionally with port (`relay.example.com:8443`).
    pub host: String,
    /// Room identifier.
    pub room_id: String,
    /// Transport scheme.
    pub scheme: Scheme,
}

impl Endpoint {
    /// Endpoint on the default (`wss`) scheme.
    pub fn new(host: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self { host: host.into(), room_id: room_id.into(), scheme: Scheme::default() }
    }

    /// Same endpoint on another scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Full WebSocket URL. The room id is percent-encoded as one path segment.
    ///
    /// # Errors
    ///
    /// - `TransportError::Endpoint` if the host does not form a valid URL
    pub fn url(&self) -> Result<Url, TransportError> {
        let base = format!("{}://{}/", self.scheme, self.host);
        let mut url =
            Url::parse(&base).map_err(|e| TransportError::Endpoint(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TransportError::Endpoint(format!("{base}: cannot be a base")))?
            .pop_if_empty()
            .push(&self.room_id);
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.host, self.room_id)
    }
}
