//! Easel host - WASM guest embedding for drawing programs.
//!
//! This crate provides the host side of the easel runtime:
//! - Sandboxed guest loading and instantiation on `wasmtime`
//! - Input marshaling into linear memory
//! - The `platform*` import surface (draw commands and error reporting)
//! - Session lifecycle (`init` once, `update` per source change,
//!   `render` per presentation change)
//! - Filesystem watching for live source and theme reloads
//! - Logging setup
//!
//! The drawing model itself (colors, commands, surfaces, themes) lives
//! in `easel-core`; this crate connects it to a guest module.

#![warn(missing_docs)]

pub mod guest;
pub mod observability;
pub mod watch;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::guest::{
        GuestMemory, GuestRuntime, GuestRuntimeConfig, GuestSession, UpdateOutcome,
    };
    pub use crate::observability::{LogFormat, TracingConfig, init_tracing};
    pub use crate::watch::{ReloadEvent, ReloadKind, ReloadWatcher};
}
