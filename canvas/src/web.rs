//! Browser binding: a [`SyncClient`] over a `<canvas>`, `localStorage` and a
//! JavaScript send callback.
//!
//! The page owns the socket. It forwards inbound messages to the methods here
//! and receives outbound placements through the callback passed to
//! [`WebClient::new`], called as `send(x, y, color)`.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::color::Color;
use crate::cooldown::now_ms;
use crate::engine::{CanvasConfig, Inbound, Notice, SyncClient, Transport, TransportError};
use crate::grid::{PixelUpdate, parse_snapshot};
use crate::input::{Button, Key};
use crate::render::Canvas2dSurface;
use crate::storage::LocalStore;
use crate::viewport::Point;

struct CallbackTransport {
    send: Function,
}

impl Transport for CallbackTransport {
    fn send_placement(&mut self, update: &PixelUpdate) -> Result<(), TransportError> {
        self.send
            .call3(
                &JsValue::NULL,
                &JsValue::from(update.x),
                &JsValue::from(update.y),
                &JsValue::from(update.color.packed()),
            )
            .map(|_| ())
            .map_err(|e| TransportError::Failed(format!("{e:?}")))
    }
}

#[wasm_bindgen]
pub struct WebClient {
    inner: SyncClient<Canvas2dSurface, CallbackTransport, LocalStore>,
}

#[wasm_bindgen]
impl WebClient {
    /// Bind to `canvas` and restore preferences from `localStorage`.
    ///
    /// # Errors
    ///
    /// Fails without a 2D context or without `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: &HtmlCanvasElement, send: Function) -> Result<WebClient, JsValue> {
        let surface = Canvas2dSurface::from_canvas(canvas)?;
        let store = LocalStore::from_window().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let inner = SyncClient::new(CanvasConfig::default(), surface, CallbackTransport { send }, store);
        Ok(Self { inner })
    }

    /// Load a snapshot body as returned by `GET /canvas/` or carried in
    /// `canvas:init`.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or a wrong-sized grid.
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let cells = parse_snapshot(&value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.load_snapshot(cells).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Apply a `pixel:updated` message. Returns `false` when it was rejected.
    #[wasm_bindgen(js_name = applyRemoteUpdate)]
    pub fn apply_remote_update(&mut self, x: u32, y: u32, color: f64) -> bool {
        let Some(color) = Color::from_f64(color) else {
            return false;
        };
        matches!(self.inner.handle(Inbound::Update(PixelUpdate::new(x, y, color))), Notice::Pixel(_))
    }

    #[wasm_bindgen(js_name = setPresence)]
    pub fn set_presence(&mut self, count: u32) {
        self.inner.handle(Inbound::PresenceCount(u64::from(count)));
    }

    /// Pointer down at canvas-relative `(x, y)` with DOM button index.
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&mut self, x: f64, y: f64, button: i16) {
        if let Some(button) = Button::from_dom(button) {
            self.inner.on_click(Point::new(x, y), button);
        }
    }

    /// Key press by DOM key name. Returns an error message when a placement
    /// was refused.
    #[wasm_bindgen(js_name = onKeyDown)]
    pub fn on_key_down(&mut self, key: &str) -> Option<String> {
        match self.inner.on_key_down(&Key::from_dom(key), now_ms()) {
            Some(Err(e)) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Place the pending preview. Returns an error message on refusal.
    #[wasm_bindgen(js_name = confirmPreview)]
    pub fn confirm_preview(&mut self) -> Option<String> {
        match self.inner.confirm_preview() {
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    #[wasm_bindgen(js_name = clearPreview)]
    pub fn clear_preview(&mut self) {
        self.inner.clear_preview();
    }

    /// Select a color by hex, CSS `rgb()` or palette name. Returns `false`
    /// for an unknown color.
    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&mut self, raw: &str) -> bool {
        match Color::parse_any(raw) {
            Some(color) => {
                self.inner.set_color(color);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setShowGrid)]
    pub fn set_show_grid(&mut self, show: bool) {
        self.inner.set_show_grid(show);
    }

    #[wasm_bindgen(js_name = countdownMessage)]
    pub fn countdown_message(&self) -> String {
        self.inner.countdown_message(now_ms())
    }
}
