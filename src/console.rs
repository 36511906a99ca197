//! Line-oriented commands for the native host.
//!
//! Each stdin line parses into a [`Command`]; [`execute`] runs it against the
//! session and returns what to print. Parsing and execution are separate so
//! both are testable without a terminal.

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;

use std::path::PathBuf;

use canvas::color::{Color, PALETTE};
use canvas::engine::{Notice, Phase, SyncClient, Transport};
use canvas::grid::PixelUpdate;
use canvas::input::{Button, Key};
use canvas::render::Surface;
use canvas::storage::KeyValueStore;
use canvas::viewport::Point;

pub const HELP: &str = "\
commands:
  place X Y [COLOR]   place a pixel now (current color when omitted)
  preview X Y         preview the current color at a cell
  click PX PY         click at a screen point
  confirm             place the previewed pixel
  cancel              drop the preview
  color COLOR         select a color (name, #rgb, #rrggbb, rgb(r, g, b))
  palette             list named colors
  grid on|off|toggle  show or hide the grid overlay
  save PATH [SCALE]   write the canvas as PNG
  status              show sync state, cooldown and color
  help                this text
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Place { x: u32, y: u32, color: Option<Color> },
    Preview { x: u32, y: u32 },
    Click { x: i32, y: i32 },
    Confirm,
    Cancel,
    SetColor(Color),
    Palette,
    Grid(GridToggle),
    Save { path: PathBuf, scale: u32 },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridToggle {
    On,
    Off,
    Flip,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a number: `{0}`")]
    BadNumber(String),
    #[error("unknown color `{0}`")]
    BadColor(String),
}

/// What the host does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Say(String),
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands or bad arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("place" | "p", [x, y]) => Command::Place { x: number(x)?, y: number(y)?, color: None },
        ("place" | "p", [x, y, color @ ..]) => Command::Place {
            x: number(x)?,
            y: number(y)?,
            color: Some(color_arg(&color.join(" "))?),
        },
        ("place" | "p", _) => return Err(CommandError::Usage("place X Y [COLOR]")),
        ("preview", [x, y]) => Command::Preview { x: number(x)?, y: number(y)? },
        ("preview", _) => return Err(CommandError::Usage("preview X Y")),
        ("click", [x, y]) => Command::Click { x: number(x)?, y: number(y)? },
        ("click", _) => return Err(CommandError::Usage("click PX PY")),
        ("confirm" | "enter", []) => Command::Confirm,
        ("cancel" | "escape", []) => Command::Cancel,
        ("color", []) => return Err(CommandError::Usage("color COLOR")),
        ("color", words) => Command::SetColor(color_arg(&words.join(" "))?),
        ("palette", []) => Command::Palette,
        ("grid", []) => Command::Grid(GridToggle::Flip),
        ("grid", ["on"]) => Command::Grid(GridToggle::On),
        ("grid", ["off"]) => Command::Grid(GridToggle::Off),
        ("grid", ["toggle"]) => Command::Grid(GridToggle::Flip),
        ("grid", _) => return Err(CommandError::Usage("grid on|off|toggle")),
        ("save", [path]) => Command::Save { path: PathBuf::from(path), scale: 1 },
        ("save", [path, scale]) => Command::Save { path: PathBuf::from(path), scale: number(scale)? },
        ("save", _) => return Err(CommandError::Usage("save PATH [SCALE]")),
        ("status", []) => Command::Status,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(head.to_owned())),
    };
    Ok(Some(command))
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse().map_err(|_| CommandError::BadNumber(raw.to_owned()))
}

fn color_arg(raw: &str) -> Result<Color, CommandError> {
    Color::parse_any(raw).ok_or_else(|| CommandError::BadColor(raw.to_owned()))
}

/// Run `command` against the session at wall-clock `now`.
pub fn execute<S, T, K>(client: &mut SyncClient<S, T, K>, command: Command, now: i64) -> Reply
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
{
    let text = match command {
        Command::Place { x, y, color } => {
            let update = PixelUpdate::new(x, y, color.unwrap_or(client.color()));
            match client.request_placement_at(update, now) {
                Ok(()) => format!("placed {} at ({x}, {y})", update.color),
                Err(e) => e.to_string(),
            }
        }
        Command::Preview { x, y } => {
            let preview = PixelUpdate::new(x, y, client.color());
            match client.set_preview(Some(preview)) {
                Ok(()) => format!("preview {} at ({x}, {y}); `confirm` to place", preview.color),
                Err(e) => e.to_string(),
            }
        }
        Command::Click { x, y } => match client.on_click(Point::new(f64::from(x), f64::from(y)), Button::Primary) {
            Some(p) => format!("preview {} at ({}, {}); `confirm` to place", p.color, p.x, p.y),
            None => "click is outside the canvas".to_owned(),
        },
        Command::Confirm => match client.on_key_down(&Key::Enter, now) {
            Some(Ok(p)) => format!("placed {} at ({}, {})", p.color, p.x, p.y),
            Some(Err(e)) => e.to_string(),
            None => "nothing to place".to_owned(),
        },
        Command::Cancel => {
            client.on_key_down(&Key::Escape, now);
            "preview cleared".to_owned()
        }
        Command::SetColor(color) => {
            client.set_color(color);
            format!("color set to {color}")
        }
        Command::Palette => PALETTE
            .iter()
            .map(|(name, color)| format!("{name:>7} {color}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Grid(toggle) => {
            let show = match toggle {
                GridToggle::On => true,
                GridToggle::Off => false,
                GridToggle::Flip => !client.show_grid(),
            };
            client.set_show_grid(show);
            format!("grid {}", if show { "on" } else { "off" })
        }
        Command::Save { path, scale } => match client.save_png(scale, &path) {
            Ok(()) => format!("saved {}", path.display()),
            Err(e) => format!("save failed: {e}"),
        },
        Command::Status => status_line(client, now),
        Command::Help => HELP.to_owned(),
        Command::Quit => return Reply::Quit,
    };
    Reply::Say(text)
}

fn status_line<S, T, K>(client: &SyncClient<S, T, K>, now: i64) -> String
where
    S: Surface,
    T: Transport,
    K: KeyValueStore,
{
    let phase = match client.phase() {
        Phase::AwaitingSnapshot => "waiting for canvas",
        Phase::Synced => "synced",
    };
    let presence = client.presence().map_or_else(|| "?".to_owned(), |n| n.to_string());
    let preview = client
        .preview()
        .map_or_else(|| "none".to_owned(), |p| format!("{} at ({}, {})", p.color, p.x, p.y));
    format!(
        "{phase}; {presence} online; color {}; preview {preview}; grid {}; {}",
        client.color(),
        if client.show_grid() { "on" } else { "off" },
        client.countdown_message(now),
    )
}

/// User-facing line for a handled server message, if worth printing.
#[must_use]
pub fn describe(notice: &Notice) -> Option<String> {
    match notice {
        Notice::Synced { cells } => Some(format!("canvas loaded ({cells} pixels)")),
        Notice::Pixel(_) => None,
        Notice::Message(message) => Some(format!("server: {message}")),
        Notice::Presence(count) => Some(format!("{count} online")),
        Notice::Rejected(error) => Some(format!("ignored server message: {error}")),
    }
}
