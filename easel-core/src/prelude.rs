//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! # Example
//!
//! ```
//! use easel_core::prelude::*;
//! ```

// Core types
pub use crate::color::Color;
pub use crate::command::{DrawCommand, DrawSink};

// Error handling
pub use crate::error::{EaselError, Result, ResultExt};

// Rasterization
pub use crate::surface::{Painter, Surface};
pub use crate::theme::Theme;
