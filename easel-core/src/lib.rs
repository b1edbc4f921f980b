//! Easel Core Library
//!
//! This crate provides the foundational types for the easel canvas host.
//!
//! # Overview
//!
//! Easel mounts a sandboxed WASM drawing guest onto a raster surface: the
//! guest interprets a small textual drawing program and emits clear and
//! line commands, and the host replays them here.
//!
//! # Key Components
//!
//! - **Color**: packed `0xRRGGBBAA` words with `#rrggbbaa` text form
//! - **DrawCommand / DrawSink**: the replayable display-list vocabulary
//! - **Surface / Painter**: a software pixmap and the themed sink over it
//! - **Theme**: host fallback colors for commands without an explicit one
//!
//! # Example
//!
//! ```
//! use easel_core::prelude::*;
//!
//! let mut painter = Painter::new(Surface::new(64, 64), Theme::default());
//! painter.clear(None);
//! painter.draw_line(0.0, 0.0, 63.0, 63.0, Some(Color::new(0xff0000ff)));
//! assert_eq!(painter.surface().pixel(0, 0), Some(Color::new(0xff0000ff)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod command;
pub mod error;
pub mod prelude;
pub mod surface;
pub mod testing;
pub mod theme;

// Re-export key types at crate root for convenience
pub use color::Color;
pub use command::{DrawCommand, DrawSink};
pub use error::{EaselError, Result};
pub use surface::{Painter, Surface};
pub use theme::Theme;
