//! One-shot HTTP fetch of the whole canvas.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use canvas::color::Color;
use canvas::grid::parse_snapshot;
use serde_json::Value;

use super::NetError;

/// `GET url` and decode the body as a snapshot.
///
/// # Errors
///
/// Returns [`NetError`] on a transport failure, a non-2xx status or a body
/// that is not a snapshot.
pub async fn fetch_snapshot(http: &reqwest::Client, url: &str) -> Result<Vec<Color>, NetError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetError::SnapshotStatus(status.as_u16()));
    }
    let body = response.json::<Value>().await?;
    let cells = parse_snapshot(&body)?;
    tracing::debug!(%url, cells = cells.len(), "snapshot fetched");
    Ok(cells)
}
