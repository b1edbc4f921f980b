//! WASM guest embedding for easel.
//!
//! This module hosts a sandboxed drawing guest inside a Wasmtime store:
//! the guest interprets a textual drawing program and calls back into the
//! host to clear the surface, draw lines and report errors.
//!
//! # Architecture
//!
//! - **GuestRuntime**: engine configuration and module loading
//! - **GuestSession**: one instantiated guest and its entrypoint sequencing
//! - **HostState / ErrorChannel**: state the host imports mutate
//! - **GuestMemory**: marshalling between host text and guest linear memory
//!
//! # Guest ABI Contract
//!
//! Guests must export:
//!
//! ```text
//! memory: Memory
//! update(ptr, len)                  // parse the program text at ptr
//! render()  or  render(width, height)
//! init()                            // optional, called once
//! ```
//!
//! `update` and `render` parameters may be any numeric WASM type; the host
//! coerces its scalars to the declared types.
//!
//! Guests may import from the `env` namespace, with or without the
//! optional color parameters:
//!
//! ```text
//! // Draw channel
//! platformClear()            or  platformClear(color)
//! platformDrawLine(x1, y1, x2, y2)  or  ...(x1, y1, x2, y2, color)
//!
//! // Error channel, atomic protocol
//! platformError(ptr)                // NUL-terminated message
//!
//! // Error channel, streamed protocol
//! platformErrorStart()
//! platformErrorPush(ptr, count)
//! platformErrorEnd()
//! ```
//!
//! Colors are `0xRRGGBBAA` words. Only imports the guest actually declares
//! are bound; an unrecognized import fails instantiation up front.
//!
//! # Example
//!
//! ```ignore
//! use easel_host::guest::{GuestRuntime, GuestSession};
//! use easel_core::{Painter, Surface, Theme};
//!
//! let runtime = GuestRuntime::with_defaults()?;
//! let module = runtime.load_file(std::path::Path::new("pen.wasm"))?;
//!
//! let painter = Painter::new(Surface::new(800, 600), Theme::default());
//! let mut session = GuestSession::instantiate(&runtime, &module, painter)?;
//!
//! let outcome = session.update("line 0 0 10 10")?;
//! if outcome.is_valid() {
//!     session.render(800, 600)?;
//! }
//! ```

mod imports;
mod memory;
mod runtime;
mod session;

// Re-export public types
pub use imports::{bind_imports, create_linker, ErrorChannel, HostState, IMPORT_NAMESPACE};
pub use memory::{GuestMemory, INPUT_OFFSET};
pub use runtime::{GuestRuntime, GuestRuntimeConfig};
pub use session::{GuestSession, UpdateOutcome};
