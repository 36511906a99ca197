//! The canvas sync client: one session object owning grid, cooldown, preview
//! and the capabilities it talks through.
//!
//! Every external trigger (inbound server message, pointer click, key press,
//! countdown tick) becomes one method call that runs to completion. Callers
//! are expected to serialize those calls on a single task; nothing in here
//! locks.
//!
//! Ordering rules:
//! - A snapshot replaces every cell and moves the session to [`Phase::Synced`].
//! - A remote update always wins for the grid; the preview stays on top while
//!   it is still pending.
//! - A local placement is written optimistically before it is sent; the server
//!   echo (or the next snapshot) settles the final value.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::path::Path;

use crate::color::Color;
use crate::consts::{BACKGROUND, HEIGHT, PIXEL_COOLDOWN_MS, PIXEL_SIZE, WIDTH};
use crate::cooldown::{Cooldown, CooldownError, now_ms};
use crate::export::{self, ExportError};
use crate::grid::{Grid, GridError, PixelUpdate};
use crate::input::{Button, Key};
use crate::render::{self, Overlay, Surface};
use crate::storage::{self, KeyValueStore, Preferences};
use crate::viewport::{Point, Viewport};

/// Failure to hand an update to the server connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection to the canvas server is closed")]
    Closed,
    #[error("transport failed: {0}")]
    Failed(String),
}

/// Outbound half of the server connection.
pub trait Transport {
    /// Queue a placement request for the server.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the connection cannot take the request.
    fn send_placement(&mut self, update: &PixelUpdate) -> Result<(), TransportError>;
}

/// Server → client messages, already decoded and color-normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Full row-major grid.
    Snapshot(Vec<Color>),
    /// One confirmed cell change.
    Update(PixelUpdate),
    /// Human-readable error or notification.
    Error(String),
    /// Active participant count.
    PresenceCount(u64),
}

/// What the host should tell the user after handling an [`Inbound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Synced { cells: usize },
    Pixel(PixelUpdate),
    Message(String),
    Presence(u64),
    Rejected(GridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingSnapshot,
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Cooldown(#[from] CooldownError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("pixel placed locally but not sent: {0}")]
    Transport(#[from] TransportError),
    #[error("no preview pixel to place")]
    NoPreview,
}

impl PlacementError {
    /// Remaining cooldown when this is a cooldown rejection.
    #[must_use]
    pub fn remaining_ms(&self) -> Option<u64> {
        match self {
            Self::Cooldown(e) => Some(e.remaining_ms),
            _ => None,
        }
    }
}

/// Canvas geometry and timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_size: u32,
    pub cooldown_ms: u64,
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            pixel_size: PIXEL_SIZE,
            cooldown_ms: PIXEL_COOLDOWN_MS,
            background: BACKGROUND,
        }
    }
}

/// Client session for one canvas.
pub struct SyncClient<S: Surface, T: Transport, K: KeyValueStore> {
    grid: Grid,
    viewport: Viewport,
    cooldown: Cooldown,
    overlay: Overlay,
    color: Color,
    phase: Phase,
    presence: Option<u64>,
    surface: S,
    transport: T,
    store: K,
}

impl<S: Surface, T: Transport, K: KeyValueStore> SyncClient<S, T, K> {
    /// Build a session, restoring cooldown, color and grid toggle from `store`,
    /// and paint the blank canvas.
    pub fn new(config: CanvasConfig, surface: S, transport: T, store: K) -> Self {
        let prefs = Preferences::load(&store);
        let mut client = Self {
            grid: Grid::filled(config.width, config.height, config.background),
            viewport: Viewport::new(config.width, config.height, config.pixel_size),
            cooldown: Cooldown::new(config.cooldown_ms, prefs.last_pixel_time),
            overlay: Overlay { show_grid: prefs.show_grid, preview: None },
            color: prefs.current_color,
            phase: Phase::AwaitingSnapshot,
            presence: None,
            surface,
            transport,
            store,
        };
        client.redraw();
        client
    }

    // --- Data inputs ---

    /// Route one inbound server message.
    pub fn handle(&mut self, message: Inbound) -> Notice {
        match message {
            Inbound::Snapshot(cells) => {
                let count = cells.len();
                match self.load_snapshot(cells) {
                    Ok(()) => Notice::Synced { cells: count },
                    Err(e) => Notice::Rejected(e),
                }
            }
            Inbound::Update(update) => match self.apply_remote_update(update) {
                Ok(()) => Notice::Pixel(update),
                Err(e) => Notice::Rejected(e),
            },
            Inbound::Error(message) => {
                tracing::warn!(%message, "server error");
                Notice::Message(message)
            }
            Inbound::PresenceCount(count) => {
                self.presence = Some(count);
                Notice::Presence(count)
            }
        }
    }

    /// Replace the whole grid and repaint. Idempotent for equal snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SnapshotLength`] for a wrong-sized snapshot; the
    /// grid and phase are left untouched.
    pub fn load_snapshot(&mut self, cells: Vec<Color>) -> Result<(), GridError> {
        if let Err(error) = self.grid.replace(cells) {
            tracing::warn!(%error, "snapshot rejected");
            return Err(error);
        }
        self.phase = Phase::Synced;
        self.redraw();
        tracing::debug!(width = self.grid.width(), height = self.grid.height(), "snapshot loaded");
        Ok(())
    }

    /// Write one server-confirmed cell and repaint only that cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] when the update misses the grid.
    pub fn apply_remote_update(&mut self, update: PixelUpdate) -> Result<(), GridError> {
        if let Err(error) = self.grid.apply(&update) {
            tracing::warn!(%error, "remote update rejected");
            return Err(error);
        }
        self.repaint_cell(update.x, update.y);
        Ok(())
    }

    // --- Placement ---

    /// Place a pixel now.
    ///
    /// # Errors
    ///
    /// See [`Self::request_placement_at`].
    pub fn request_placement(&mut self, update: PixelUpdate) -> Result<(), PlacementError> {
        self.request_placement_at(update, now_ms())
    }

    /// Place a pixel at wall-clock `now`.
    ///
    /// The stored placement time is re-read first, so a placement from
    /// another session sharing the store also closes the gate. On success the
    /// cell is written locally, the cooldown restarts and is persisted, and
    /// the update is handed to the transport.
    ///
    /// # Errors
    ///
    /// - [`PlacementError::Grid`]: coordinates off the canvas, nothing changed.
    /// - [`PlacementError::Cooldown`]: too soon, nothing changed and nothing sent.
    /// - [`PlacementError::Transport`]: the local write stands but the server
    ///   was not told.
    pub fn request_placement_at(&mut self, update: PixelUpdate, now: i64) -> Result<(), PlacementError> {
        self.grid.check(&update)?;
        self.sync_cooldown();
        self.cooldown.check(now)?;

        self.grid.apply(&update)?;
        self.cooldown.record(now);
        if let Err(error) = storage::save_last_pixel_time(&mut self.store, now) {
            tracing::warn!(%error, "failed to persist placement time");
        }
        self.repaint_cell(update.x, update.y);

        self.transport.send_placement(&update)?;
        tracing::info!(x = update.x, y = update.y, color = %update.color, "pixel placed");
        Ok(())
    }

    /// Place the pending preview now.
    ///
    /// # Errors
    ///
    /// See [`Self::confirm_preview_at`].
    pub fn confirm_preview(&mut self) -> Result<PixelUpdate, PlacementError> {
        self.confirm_preview_at(now_ms())
    }

    /// Place the pending preview at `now`.
    ///
    /// The preview survives a cooldown rejection so it can be retried; any
    /// other outcome clears it.
    ///
    /// # Errors
    ///
    /// [`PlacementError::NoPreview`] without a preview, otherwise as
    /// [`Self::request_placement_at`].
    pub fn confirm_preview_at(&mut self, now: i64) -> Result<PixelUpdate, PlacementError> {
        let preview = self.overlay.preview.ok_or(PlacementError::NoPreview)?;
        let result = self.request_placement_at(preview, now);
        if !matches!(result, Err(PlacementError::Cooldown(_))) {
            self.clear_preview();
        }
        result.map(|()| preview)
    }

    // --- Preview ---

    /// Replace the pending preview. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for a preview off the canvas; the
    /// previous preview is kept.
    pub fn set_preview(&mut self, preview: Option<PixelUpdate>) -> Result<(), GridError> {
        let Some(next) = preview else {
            self.clear_preview();
            return Ok(());
        };
        self.grid.check(&next)?;
        let previous = self.overlay.preview.replace(next);
        if let Some(old) = previous.filter(|old| !old.same_cell(&next)) {
            self.repaint_cell(old.x, old.y);
        }
        self.repaint_cell(next.x, next.y);
        Ok(())
    }

    /// Drop the preview and restore its cell's confirmed color.
    pub fn clear_preview(&mut self) {
        if let Some(old) = self.overlay.preview.take() {
            self.repaint_cell(old.x, old.y);
        }
    }

    // --- Pointer / keyboard ---

    /// Primary click at a screen point: preview the current color there.
    pub fn on_click(&mut self, screen: Point, button: Button) -> Option<PixelUpdate> {
        if button != Button::Primary {
            return None;
        }
        let (x, y) = self.viewport.cell_at(screen)?;
        let preview = PixelUpdate::new(x, y, self.color);
        match self.set_preview(Some(preview)) {
            Ok(()) => Some(preview),
            Err(_) => None,
        }
    }

    /// Key press at `now`. Enter places the preview, Escape drops it.
    /// Returns `None` when the key does nothing.
    pub fn on_key_down(&mut self, key: &Key, now: i64) -> Option<Result<PixelUpdate, PlacementError>> {
        match key {
            Key::Enter => Some(self.confirm_preview_at(now)),
            Key::Escape => {
                self.clear_preview();
                None
            }
            Key::Other(_) => None,
        }
    }

    // --- Preferences ---

    /// Select the color for future previews and persist it.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if let Err(error) = storage::save_current_color(&mut self.store, color) {
            tracing::warn!(%error, "failed to persist current color");
        }
    }

    /// Toggle the grid overlay, persist it and repaint.
    pub fn set_show_grid(&mut self, show: bool) {
        self.overlay.show_grid = show;
        if let Err(error) = storage::save_show_grid(&mut self.store, show) {
            tracing::warn!(%error, "failed to persist grid toggle");
        }
        self.redraw();
    }

    // --- Render ---

    /// Repaint everything.
    pub fn redraw(&mut self) {
        render::draw_full(&mut self.surface, &self.grid, &self.viewport, &self.overlay);
    }

    /// PNG of the confirmed grid, `scale` pixels per cell.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] on a zero or oversized scale or an encoder failure.
    pub fn export_png(&self, scale: u32) -> Result<Vec<u8>, ExportError> {
        export::grid_png(&self.grid, scale)
    }

    /// Write the confirmed grid to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] on a zero or oversized scale, an encoder
    /// failure or an I/O error.
    pub fn save_png(&self, scale: u32, path: &Path) -> Result<(), ExportError> {
        export::save_grid_png(&self.grid, scale, path)
    }

    fn repaint_cell(&mut self, x: u32, y: u32) {
        render::draw_cell(&mut self.surface, &self.grid, &self.viewport, &self.overlay, x, y);
    }

    // --- Queries ---

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.grid.get(x, y)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn preview(&self) -> Option<PixelUpdate> {
        self.overlay.preview
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn show_grid(&self) -> bool {
        self.overlay.show_grid
    }

    #[must_use]
    pub fn presence(&self) -> Option<u64> {
        self.presence
    }

    #[must_use]
    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Countdown text at `now`, including placements other sessions stored.
    #[must_use]
    pub fn countdown_message(&self, now: i64) -> String {
        self.stored_cooldown().message(now)
    }

    /// In-memory cooldown merged with the store's timestamp.
    fn stored_cooldown(&self) -> Cooldown {
        let mut cooldown = self.cooldown;
        if let Some(last) = storage::load_last_pixel_time(&self.store) {
            cooldown.observe(last);
        }
        cooldown
    }

    fn sync_cooldown(&mut self) {
        self.cooldown = self.stored_cooldown();
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[must_use]
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Tear down the session and hand back its capabilities.
    pub fn into_parts(self) -> (S, T, K) {
        (self.surface, self.transport, self.store)
    }
}
