//! Server connection: HTTP snapshot fetch, websocket frame transport and the
//! mapping between wire frames and canvas messages.

pub mod protocol;
pub mod snapshot;
pub mod socket;

use canvas::grid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("snapshot fetch failed: {0}")]
    SnapshotFetch(#[from] reqwest::Error),
    #[error("snapshot fetch failed: HTTP {0}")]
    SnapshotStatus(u16),
    #[error("snapshot rejected: {0}")]
    Snapshot(#[from] GridError),
    #[error("websocket failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Codec(#[from] frames::CodecError),
}

impl From<tokio_tungstenite::tungstenite::Error> for NetError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}
