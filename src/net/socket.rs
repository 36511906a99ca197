//! Websocket connection carrying binary `frames` messages.
//!
//! The socket is split: the read half stays with the session loop, the write
//! half moves into a writer task fed by an unbounded channel. That keeps
//! [`ChannelTransport::send_placement`] synchronous, so the canvas engine
//! never awaits.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::fmt::Display;

use canvas::cooldown::now_ms;
use canvas::engine::{Transport, TransportError};
use canvas::grid::PixelUpdate;
use frames::Frame;
use futures_util::stream::SplitStream;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::NetError;
use super::protocol::placement_frame;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound placements, routed to whichever connection is current.
#[derive(Debug, Default)]
pub struct ChannelTransport {
    tx: Option<mpsc::UnboundedSender<Frame>>,
}

impl ChannelTransport {
    /// Transport with no connection; every send fails with `Closed`.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, tx: mpsc::UnboundedSender<Frame>) {
        self.tx = Some(tx);
    }

    pub fn detach(&mut self) {
        self.tx = None;
    }
}

impl Transport for ChannelTransport {
    fn send_placement(&mut self, update: &PixelUpdate) -> Result<(), TransportError> {
        let Some(tx) = &self.tx else {
            return Err(TransportError::Closed);
        };
        tx.send(placement_frame(update, now_ms())).map_err(|_| TransportError::Closed)
    }
}

/// A live connection: inbound frames plus the writer task's queue.
pub struct Connection {
    pub inbound: SplitStream<WsStream>,
    pub outbound: mpsc::UnboundedSender<Frame>,
    writer: JoinHandle<()>,
}

impl Connection {
    /// Stop the writer. Queued frames not yet sent are dropped.
    pub fn close(self) {
        self.writer.abort();
    }
}

/// Open the websocket at `url` and start its writer task.
///
/// # Errors
///
/// Returns [`NetError::Ws`] when the handshake fails.
pub async fn connect(url: &str) -> Result<Connection, NetError> {
    let (stream, _) = connect_async(url).await?;
    info!(%url, "websocket connected");
    let (sink, inbound) = stream.split();
    let (outbound, rx) = mpsc::unbounded_channel();
    let writer = spawn_writer(sink, rx);
    Ok(Connection { inbound, outbound, writer })
}

/// Encode and send every queued frame until the queue closes or a send fails.
pub fn spawn_writer<S>(mut sink: S, mut rx: mpsc::UnboundedReceiver<Frame>) -> JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let bytes = frames::encode_frame(&frame);
            if let Err(error) = sink.send(Message::Binary(bytes.into())).await {
                warn!(%error, id = %frame.id, syscall = %frame.syscall, "websocket send failed");
                return;
            }
            debug!(id = %frame.id, syscall = %frame.syscall, "frame sent");
        }
        if let Err(error) = sink.close().await {
            debug!(%error, "websocket close failed");
        }
    })
}

/// Next decoded frame. `None` once the peer closed the socket.
///
/// Text, ping and pong messages are skipped.
pub async fn next_frame<St>(inbound: &mut St) -> Option<Result<Frame, NetError>>
where
    St: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let message = match inbound.next().await? {
            Ok(message) => message,
            Err(error) => return Some(Err(error.into())),
        };
        match message {
            Message::Binary(bytes) => return Some(frames::decode_frame(&bytes).map_err(NetError::from)),
            Message::Close(_) => return None,
            _ => {}
        }
    }
}
