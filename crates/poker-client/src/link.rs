//! Shareable room links.
//!
//! `{origin}/poker-planning/{host}/{room_id}/{room_name}`, each segment
//! percent-encoded. Older links carrying the name as a `?roomName=` query
//! still parse.

use thiserror::Error;
use url::Url;

/// First path segment of every room link.
pub const ROUTE: &str = "poker-planning";

/// Errors raised while parsing a room link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Not a URL, or a URL that cannot carry a path.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Path does not end in the room route.
    #[error("not a room link: {0}")]
    WrongRoute(String),

    /// A required field is missing or blank.
    #[error("missing {0}")]
    Missing(&'static str),
}

/// Everything needed to open someone else's room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomLink {
    /// Relay host.
    pub host_name: String,
    /// Room identifier.
    pub room_id: String,
    /// Human-readable room name.
    pub room_name: String,
}

impl RoomLink {
    /// Link rooted at `origin` (e.g. `https://planning.example.com`).
    ///
    /// # Errors
    ///
    /// - `LinkError::InvalidUrl` if `origin` is not an absolute base URL
    pub fn to_url(&self, origin: &str) -> Result<Url, LinkError> {
        let mut url = Url::parse(origin).map_err(|e| LinkError::InvalidUrl(format!("{origin}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| LinkError::InvalidUrl(origin.to_owned()))?
            .pop_if_empty()
            .extend([ROUTE, self.host_name.as_str(), self.room_id.as_str(), self.room_name.as_str()]);
        url.set_query(None);
        Ok(url)
    }

    /// Parse a link produced by [`RoomLink::to_url`].
    ///
    /// The route may sit under any prefix of the origin's path.
    ///
    /// # Errors
    ///
    /// - `LinkError::InvalidUrl` if `text` is not a URL
    /// - `LinkError::WrongRoute` if the path does not end in
    ///   `poker-planning/{host}/{room}/{name}` or `poker-planning/{host}/{room}`
    /// - `LinkError::Missing` if the host, room id or room name is blank
    pub fn parse(text: &str) -> Result<Self, LinkError> {
        let url = Url::parse(text.trim()).map_err(|e| LinkError::InvalidUrl(format!("{text}: {e}")))?;
        let segments: Vec<String> = url
            .path_segments()
            .ok_or_else(|| LinkError::InvalidUrl(text.to_owned()))?
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();

        let link = match segments.as_slice() {
            [.., route, host_name, room_id, room_name] if route == ROUTE => Self {
                host_name: host_name.clone(),
                room_id: room_id.clone(),
                room_name: room_name.clone(),
            },
            [.., route, host_name, room_id] if route == ROUTE => Self {
                host_name: host_name.clone(),
                room_id: room_id.clone(),
                room_name: url
                    .query_pairs()
                    .find(|(key, _)| key == "roomName")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default(),
            },
            _ => return Err(LinkError::WrongRoute(url.path().to_owned())),
        };
        link.validate()?;
        Ok(link)
    }

    fn validate(&self) -> Result<(), LinkError> {
        if self.host_name.trim().is_empty() {
            return Err(LinkError::Missing("host name"));
        }
        if self.room_id.trim().is_empty() {
            return Err(LinkError::Missing("room id"));
        }
        if self.room_name.trim().is_empty() {
            return Err(LinkError::Missing("room name"));
        }
        Ok(())
    }
}

fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_owned(),
    }
}
