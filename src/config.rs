//! Command-line and environment configuration.
//!
//! Every flag has a `PAINTER_*` environment fallback; `main` loads a `.env`
//! file first so local overrides need no shell exports.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use canvas::consts::{BACKGROUND, HEIGHT, PIXEL_COOLDOWN_MS, WIDTH};
use canvas::engine::CanvasConfig;
use clap::{Parser, Subcommand};

use crate::net::NetError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_WS_PATH: &str = "/ws";
pub const DEFAULT_STATE_FILE: &str = ".painter-state.json";

const MAX_CELLS_PER_SIDE: i64 = 10_000;
const MAX_PIXEL_SIZE: i64 = 100;

/// Largest local framebuffer the host will allocate (64 Mpx, 256 MB RGBA).
pub const MAX_FRAMEBUFFER_PIXELS: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "{width}x{height} cells at pixel size {pixel_size} needs more than {max} screen pixels",
        max = MAX_FRAMEBUFFER_PIXELS
    )]
    FramebufferTooLarge { width: u32, height: u32, pixel_size: u32 },
}

#[derive(Parser, Debug)]
#[command(name = "painter", about = "Shared pixel canvas client")]
pub struct Cli {
    /// HTTP origin of the canvas server.
    #[arg(long, env = "PAINTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Websocket path on the same origin.
    #[arg(long, env = "PAINTER_WS_PATH", default_value = DEFAULT_WS_PATH)]
    pub ws_path: String,

    /// JSON file holding cooldown, color and grid preferences.
    #[arg(long, env = "PAINTER_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    #[arg(long, env = "PAINTER_COOLDOWN_MS", default_value_t = PIXEL_COOLDOWN_MS)]
    pub cooldown_ms: u64,

    #[arg(long, env = "PAINTER_WIDTH", default_value_t = WIDTH, value_parser = clap::value_parser!(u32).range(1..=MAX_CELLS_PER_SIDE))]
    pub width: u32,

    #[arg(long, env = "PAINTER_HEIGHT", default_value_t = HEIGHT, value_parser = clap::value_parser!(u32).range(1..=MAX_CELLS_PER_SIDE))]
    pub height: u32,

    /// Screen pixels per cell in the local framebuffer.
    #[arg(long, env = "PAINTER_PIXEL_SIZE", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_PIXEL_SIZE))]
    pub pixel_size: u32,

    /// Delay before reconnecting after the socket drops.
    #[arg(long, env = "PAINTER_RECONNECT_MS", default_value_t = 2_000)]
    pub reconnect_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect and read placement commands from stdin (default).
    Run,
    /// Fetch the current canvas once and write it as PNG.
    Snapshot {
        out: PathBuf,
        #[arg(long, default_value_t = 1)]
        scale: u32,
    },
}

impl Cli {
    /// Reject geometry whose framebuffer would not fit in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FramebufferTooLarge`] past [`MAX_FRAMEBUFFER_PIXELS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = u64::from(self.pixel_size);
        let pixels = (u64::from(self.width) * size).saturating_mul(u64::from(self.height) * size);
        if pixels > MAX_FRAMEBUFFER_PIXELS {
            return Err(ConfigError::FramebufferTooLarge {
                width: self.width,
                height: self.height,
                pixel_size: self.pixel_size,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn canvas_config(&self) -> CanvasConfig {
        CanvasConfig {
            width: self.width,
            height: self.height,
            pixel_size: self.pixel_size,
            cooldown_ms: self.cooldown_ms,
            background: BACKGROUND,
        }
    }

    #[must_use]
    pub fn snapshot_url(&self) -> String {
        snapshot_url(&self.base_url)
    }

    /// # Errors
    ///
    /// Returns [`NetError::InvalidBaseUrl`] unless the base URL is `http` or `https`.
    pub fn ws_url(&self) -> Result<String, NetError> {
        ws_url(&self.base_url, &self.ws_path)
    }
}

/// `GET` endpoint serving the full canvas.
#[must_use]
pub fn snapshot_url(base_url: &str) -> String {
    format!("{}/canvas/", base_url.trim_end_matches('/'))
}

/// Websocket URL on the same origin as `base_url`.
///
/// # Errors
///
/// Returns [`NetError::InvalidBaseUrl`] unless the base URL is `http` or `https`.
pub fn ws_url(base_url: &str, path: &str) -> Result<String, NetError> {
    let base = base_url.trim_end_matches('/');
    let path = if path.starts_with('/') { path.to_owned() } else { format!("/{path}") };
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{path}"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{path}"));
    }
    Err(NetError::InvalidBaseUrl(base_url.to_owned()))
}
