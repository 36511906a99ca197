//! The native host's event loop.
//!
//! One task owns the [`SyncClient`] and multiplexes three sources with
//! `select!`: decoded socket frames, stdin command lines, and a one-second
//! countdown tick. Each event is handled to completion before the next.
//!
//! LIFECYCLE
//! =========
//! 1. Fetch the snapshot over HTTP (failure is reported, not fatal)
//! 2. Open the websocket and attach its writer to the transport
//! 3. Loop until the socket drops or the user quits
//! 4. On a drop or a failed connect: detach, wait, go back to 1
//!
//! Console commands are served during the wait too. Placements made while
//! detached are written locally and reported as not sent.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::Duration;

use canvas::cooldown::now_ms;
use canvas::engine::{Inbound, SyncClient, Transport};
use canvas::render::{Framebuffer, Surface};
use canvas::storage::{FileStore, KeyValueStore};
use canvas::viewport::Viewport;
use frames::Frame;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::AppError;
use crate::config::Cli;
use crate::console::{self, Reply};
use crate::net::NetError;
use crate::net::protocol::inbound_from_frame;
use crate::net::snapshot::fetch_snapshot;
use crate::net::socket::{self, ChannelTransport, Connection};

type HostClient = SyncClient<Framebuffer, ChannelTransport, FileStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Quit,
    Disconnected,
}

/// Connect, reconnecting on drops, until the user quits or stdin closes.
///
/// # Errors
///
/// Returns [`AppError`] when the state file cannot be opened, the base URL is
/// invalid, or stdin fails.
pub async fn run(cli: &Cli) -> Result<(), AppError> {
    let store = FileStore::open(&cli.state_file)?;
    let config = cli.canvas_config();
    let surface = Framebuffer::for_viewport(&Viewport::new(config.width, config.height, config.pixel_size));
    let mut client: HostClient = SyncClient::new(config, surface, ChannelTransport::detached(), store);

    let http = reqwest::Client::new();
    let ws_url = cli.ws_url()?;
    let snapshot_url = cli.snapshot_url();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut countdown = Countdown::default();

    println!("{}", client.countdown_message(now_ms()));
    loop {
        refresh_snapshot(&mut client, &http, &snapshot_url).await;

        match socket::connect(&ws_url).await {
            Ok(connection) => {
                client.transport_mut().attach(connection.outbound.clone());
                let exit = drive(&mut client, connection, &mut lines, &mut ticker, &mut countdown).await?;
                client.transport_mut().detach();
                if exit == Exit::Quit {
                    return Ok(());
                }
                eprintln!("connection lost; reconnecting");
            }
            Err(error) => {
                warn!(%error, url = %ws_url, "websocket connect failed");
                eprintln!("{error}");
            }
        }
        if idle(&mut client, &mut lines, Duration::from_millis(cli.reconnect_ms)).await? == Exit::Quit {
            return Ok(());
        }
    }
}

/// Serve console commands until `delay` elapses or the user quits.
async fn idle<S, T, K, R>(
    client: &mut SyncClient<S, T, K>,
    lines: &mut tokio::io::Lines<R>,
    delay: Duration,
) -> Result<Exit, AppError>
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
    R: tokio::io::AsyncBufRead + Unpin,
{
    let wait = tokio::time::sleep(delay);
    tokio::pin!(wait);
    loop {
        tokio::select! {
            () = &mut wait => return Ok(Exit::Disconnected),
            line = lines.next_line() => {
                if let Some(exit) = console_input(client, line?) {
                    return Ok(exit);
                }
            }
        }
    }
}

async fn refresh_snapshot(client: &mut HostClient, http: &reqwest::Client, url: &str) {
    match fetch_snapshot(http, url).await {
        Ok(cells) => {
            let notice = client.handle(Inbound::Snapshot(cells));
            if let Some(text) = console::describe(&notice) {
                println!("{text}");
            }
        }
        Err(error) => {
            warn!(%error, %url, "snapshot fetch failed");
            eprintln!("{error}");
        }
    }
}

async fn drive<R>(
    client: &mut HostClient,
    mut connection: Connection,
    lines: &mut tokio::io::Lines<R>,
    ticker: &mut tokio::time::Interval,
    countdown: &mut Countdown,
) -> Result<Exit, AppError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let exit = loop {
        tokio::select! {
            frame = socket::next_frame(&mut connection.inbound) => match frame {
                Some(Ok(frame)) => {
                    if let Some(text) = on_frame(client, &frame) {
                        println!("{text}");
                    }
                }
                Some(Err(NetError::Codec(error))) => warn!(%error, "dropping undecodable frame"),
                Some(Err(error)) => {
                    warn!(%error, "websocket read failed");
                    break Exit::Disconnected;
                }
                None => {
                    info!("websocket closed by server");
                    break Exit::Disconnected;
                }
            },
            line = lines.next_line() => {
                if let Some(exit) = console_input(client, line?) {
                    break exit;
                }
            }
            _ = ticker.tick() => {
                if let Some(text) = countdown.observe(client.countdown_message(now_ms())) {
                    println!("{text}");
                }
            }
        }
    };
    connection.close();
    Ok(exit)
}

/// Route one socket frame into the session; returns a line to print.
pub fn on_frame<S, T, K>(client: &mut SyncClient<S, T, K>, frame: &Frame) -> Option<String>
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
{
    match inbound_from_frame(frame) {
        Ok(Some(inbound)) => console::describe(&client.handle(inbound)),
        Ok(None) => {
            tracing::debug!(syscall = %frame.syscall, "ignoring frame");
            None
        }
        Err(error) => {
            warn!(%error, syscall = %frame.syscall, "malformed frame");
            None
        }
    }
}

/// Print the reply to one stdin line. `Some(Exit::Quit)` on `quit` or when
/// stdin closed.
fn console_input<S, T, K>(client: &mut SyncClient<S, T, K>, line: Option<String>) -> Option<Exit>
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
{
    let Some(line) = line else {
        return Some(Exit::Quit);
    };
    match on_line(client, &line, now_ms())? {
        Reply::Say(text) => {
            println!("{text}");
            None
        }
        Reply::Quit => Some(Exit::Quit),
    }
}

/// Parse and run one stdin line; `None` for blank lines.
pub fn on_line<S, T, K>(client: &mut SyncClient<S, T, K>, line: &str, now: i64) -> Option<Reply>
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
{
    match console::parse_command(line) {
        Ok(Some(command)) => Some(console::execute(client, command, now)),
        Ok(None) => None,
        Err(error) => Some(Reply::Say(error.to_string())),
    }
}

/// Suppresses repeated countdown text between ticks.
#[derive(Debug, Default)]
pub struct Countdown {
    last: Option<String>,
}

impl Countdown {
    /// `Some(message)` when it differs from the previous tick.
    pub fn observe(&mut self, message: String) -> Option<String> {
        if self.last.as_deref() == Some(message.as_str()) {
            return None;
        }
        self.last = Some(message.clone());
        Some(message)
    }
}
