//! Frame ⇄ canvas message mapping.
//!
//! Inbound frames become [`Inbound`] values; anything the canvas does not
//! care about maps to `None`. Any frame with status `error` is surfaced as an
//! [`Inbound::Error`] regardless of its syscall.

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;

use canvas::engine::Inbound;
use canvas::grid::{GridError, PixelUpdate, parse_snapshot};
use frames::{
    Frame, SYSCALL_CANVAS_INIT, SYSCALL_PIXEL_PLACE, SYSCALL_PIXEL_UPDATED, SYSCALL_PRESENCE_COUNT,
    SYSCALL_SESSION_ERROR, Status,
};
use serde_json::Value;
use uuid::Uuid;

/// Shown when an error frame carries no readable message.
pub const FALLBACK_ERROR: &str = "request failed";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("bad {syscall} payload: {source}")]
    Payload {
        syscall: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("bad presence:count payload: missing count")]
    MissingCount,
    #[error(transparent)]
    Snapshot(#[from] GridError),
}

/// Map one inbound frame.
///
/// # Errors
///
/// Returns [`ProtocolError`] when a known syscall carries a malformed payload.
pub fn inbound_from_frame(frame: &Frame) -> Result<Option<Inbound>, ProtocolError> {
    if frame.status == Status::Error {
        return Ok(Some(error_inbound(frame)));
    }
    match frame.syscall.as_str() {
        SYSCALL_CANVAS_INIT => Ok(Some(Inbound::Snapshot(parse_snapshot(&frame.data)?))),
        SYSCALL_PIXEL_UPDATED => serde_json::from_value::<PixelUpdate>(frame.data.clone())
            .map(|update| Some(Inbound::Update(update)))
            .map_err(|source| ProtocolError::Payload { syscall: SYSCALL_PIXEL_UPDATED, source }),
        SYSCALL_SESSION_ERROR => Ok(Some(error_inbound(frame))),
        SYSCALL_PRESENCE_COUNT => frame
            .data
            .get("count")
            .and_then(Value::as_u64)
            .map(|count| Some(Inbound::PresenceCount(count)))
            .ok_or(ProtocolError::MissingCount),
        _ => Ok(None),
    }
}

fn error_inbound(frame: &Frame) -> Inbound {
    Inbound::Error(frame.error_message().unwrap_or(FALLBACK_ERROR).to_owned())
}

/// Build the `pixel:place` request for a local placement.
#[must_use]
pub fn placement_frame(update: &PixelUpdate, ts: i64) -> Frame {
    let data = serde_json::json!({
        "x": update.x,
        "y": update.y,
        "color": update.color.packed(),
    });
    Frame::request(Uuid::new_v4().to_string(), ts, SYSCALL_PIXEL_PLACE, data)
}
