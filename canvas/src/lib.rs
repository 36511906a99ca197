//! Client core for the shared pixel canvas.
//!
//! A fixed W×H grid of colors is kept in sync with a server: a snapshot seeds
//! it, single-cell updates patch it, and the local user may place one pixel
//! per cooldown period after previewing it. This crate has no I/O of its own.
//! Drawing, persistence and the server connection are injected as the
//! [`render::Surface`], [`storage::KeyValueStore`] and [`engine::Transport`]
//! capabilities, so the same [`engine::SyncClient`] drives a browser canvas
//! (with the `web` feature) or a native host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::SyncClient`] session object and inbound message routing |
//! | [`grid`] | Row-major color grid, single-cell updates, snapshot decoding |
//! | [`color`] | Packed RGB color and wire/CSS normalization |
//! | [`cooldown`] | Placement cooldown gate and countdown text |
//! | [`storage`] | Key-value persistence capability and stored preferences |
//! | [`viewport`] | Screen point to cell mapping |
//! | [`input`] | Pointer buttons and keys |
//! | [`render`] | Drawing surface trait, in-memory framebuffer, canvas 2D surface |
//! | [`export`] | PNG export |
//! | [`consts`] | Canvas dimensions, cooldown, storage keys |
//! | `web` | `wasm-bindgen` entry point (feature `web`) |

pub mod color;
pub mod consts;
pub mod cooldown;
pub mod engine;
pub mod export;
pub mod grid;
pub mod input;
pub mod render;
pub mod storage;
pub mod viewport;
#[cfg(feature = "web")]
pub mod web;
