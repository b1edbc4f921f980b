//! Logging infrastructure for the host.
//!
//! Structured logging via `tracing`, with the output format and filter
//! picked up from the environment.
//!
//! # Configuration
//!
//! Logging format is controlled via the `EASEL_LOG_FORMAT` env var:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable colored output (default for TTY)
//! - `compact` - Compact single-line format (default otherwise)
//!
//! The filter comes from `EASEL_LOG_LEVEL`, falling back to `RUST_LOG`,
//! falling back to `info`.
//!
//! # Example
//!
//! ```ignore
//! use easel_host::observability::{TracingConfig, init_tracing};
//!
//! init_tracing(&TracingConfig::from_env())?;
//!
//! // Or with explicit settings
//! let config = TracingConfig::builder()
//!     .json_format(true)
//!     .log_filter("debug")
//!     .build();
//! init_tracing(&config)?;
//! ```

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::init_tracing;
