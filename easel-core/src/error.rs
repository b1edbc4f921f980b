//! Error types for easel.
//!
//! This module provides strongly-typed errors with actionable context.
//! All errors include relevant identifiers (import names, memory offsets,
//! file paths) to aid in debugging a misbehaving guest or host setup.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for easel operations.
#[derive(Error, Debug)]
pub enum EaselError {
    // =========================================================================
    // Guest Module Errors (E001-E099)
    // =========================================================================
    /// Failed to compile or load a guest module.
    #[error("E001: Failed to load guest module '{module}': {cause}")]
    ModuleLoad {
        /// The module that failed to load.
        module: String,
        /// Reason for the load failure.
        cause: String,
    },

    /// Failed to instantiate a compiled guest module.
    #[error("E002: Failed to instantiate guest module '{module}': {cause}")]
    ModuleInstantiate {
        /// The module that failed to instantiate.
        module: String,
        /// Reason for the instantiation failure.
        cause: String,
    },

    /// A required guest export is missing.
    #[error("E003: Guest module does not export '{name}'")]
    MissingExport {
        /// The export name that was not found.
        name: String,
    },

    /// The guest declares an import the host does not provide.
    #[error("E004: Unsupported guest import '{namespace}.{name}'")]
    UnsupportedImport {
        /// The import namespace (module field of the import).
        namespace: String,
        /// The import name.
        name: String,
    },

    /// A guest entrypoint trapped or ran out of fuel.
    #[error("E005: Guest entrypoint '{entry}' failed: {cause}")]
    EntrypointCall {
        /// The entrypoint that failed.
        entry: String,
        /// Reason for the failure (trap message, fuel exhaustion).
        cause: String,
    },

    /// An import or export exists but its signature is unusable.
    #[error("E006: Unusable signature for '{name}': {cause}")]
    BadSignature {
        /// The import or export with the unusable signature.
        name: String,
        /// Description of the signature mismatch.
        cause: String,
    },

    // =========================================================================
    // Guest Memory Errors (E100-E199)
    // =========================================================================
    /// A read from guest memory went out of bounds.
    #[error("E101: Guest memory read out of bounds: {count} bytes at offset {offset}")]
    MemoryRead {
        /// The offset the read started at.
        offset: u64,
        /// Number of bytes requested.
        count: u64,
    },

    /// A write into guest memory went out of bounds.
    #[error("E102: Guest memory write out of bounds: {count} bytes at offset {offset}")]
    MemoryWrite {
        /// The offset the write started at.
        offset: u64,
        /// Number of bytes to be written.
        count: u64,
    },

    /// Growing guest memory failed.
    #[error("E103: Failed to grow guest memory by {pages} pages: {cause}")]
    MemoryGrow {
        /// Number of 64 KiB pages requested.
        pages: u64,
        /// Reason for the growth failure.
        cause: String,
    },

    // =========================================================================
    // Color/Theme Errors (E200-E299)
    // =========================================================================
    /// A color string could not be parsed.
    #[error("E201: Invalid color '{value}': {cause}")]
    ColorParse {
        /// The string that failed to parse.
        value: String,
        /// Description of the parse failure.
        cause: String,
    },

    /// A theme file could not be parsed.
    #[error("E202: Failed to parse theme at {path}: {cause}")]
    ThemeParse {
        /// The path to the theme file.
        path: PathBuf,
        /// Reason for the parse failure.
        cause: String,
    },

    // =========================================================================
    // Reload Watcher Errors (E300-E399)
    // =========================================================================
    /// The filesystem watcher could not be set up.
    #[error("E301: Failed to watch {path}: {cause}")]
    WatchSetup {
        /// The path that could not be watched.
        path: PathBuf,
        /// Reason for the setup failure.
        cause: String,
    },

    /// The reload event channel closed unexpectedly.
    #[error("E302: Reload watcher channel closed")]
    WatchClosed,

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// File I/O error.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// The path where the I/O error occurred.
        path: PathBuf,
        /// Description of the I/O error.
        cause: String,
    },
}

impl EaselError {
    /// Get the error code (e.g., "E001").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleLoad { .. } => "E001",
            Self::ModuleInstantiate { .. } => "E002",
            Self::MissingExport { .. } => "E003",
            Self::UnsupportedImport { .. } => "E004",
            Self::EntrypointCall { .. } => "E005",
            Self::BadSignature { .. } => "E006",
            Self::MemoryRead { .. } => "E101",
            Self::MemoryWrite { .. } => "E102",
            Self::MemoryGrow { .. } => "E103",
            Self::ColorParse { .. } => "E201",
            Self::ThemeParse { .. } => "E202",
            Self::WatchSetup { .. } => "E301",
            Self::WatchClosed => "E302",
            Self::Io { .. } => "E901",
        }
    }

    /// Check if this error was provoked by guest behavior at runtime
    /// (bad pointers, traps) rather than by host setup.
    #[must_use]
    pub fn is_guest_fault(&self) -> bool {
        matches!(
            self,
            Self::EntrypointCall { .. } | Self::MemoryRead { .. }
        )
    }

    /// Check if this error is a host-level integration fault detected at
    /// startup, before any guest code runs.
    #[must_use]
    pub fn is_startup_fault(&self) -> bool {
        matches!(
            self,
            Self::ModuleLoad { .. }
                | Self::ModuleInstantiate { .. }
                | Self::MissingExport { .. }
                | Self::UnsupportedImport { .. }
                | Self::BadSignature { .. }
        )
    }
}

/// Result type alias using `EaselError`.
pub type Result<T> = std::result::Result<T, EaselError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Convert the error into an I/O error tagged with `path`.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Convert the error into an entrypoint failure tagged with `entry`.
    fn with_entry(self, entry: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| EaselError::Io {
            path: path.into(),
            cause: e.to_string(),
        })
    }

    fn with_entry(self, entry: &str) -> Result<T> {
        self.map_err(|e| EaselError::EntrypointCall {
            entry: entry.to_string(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_correct() {
        let err = EaselError::ModuleLoad {
            module: "pen.wasm".to_string(),
            cause: "bad magic".to_string(),
        };
        assert_eq!(err.code(), "E001");

        let err = EaselError::MemoryRead {
            offset: 4096,
            count: 16,
        };
        assert_eq!(err.code(), "E101");
    }

    #[test]
    fn error_display() {
        let err = EaselError::EntrypointCall {
            entry: "update".to_string(),
            cause: "all fuel consumed".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("E005"));
        assert!(msg.contains("update"));
        assert!(msg.contains("all fuel consumed"));
    }

    #[test]
    fn guest_faults() {
        assert!(
            EaselError::EntrypointCall {
                entry: "render".to_string(),
                cause: "trap".to_string()
            }
            .is_guest_fault()
        );

        assert!(
            !EaselError::MissingExport {
                name: "memory".to_string()
            }
            .is_guest_fault()
        );
    }

    #[test]
    fn startup_faults() {
        assert!(
            EaselError::UnsupportedImport {
                namespace: "env".to_string(),
                name: "platformBeep".to_string()
            }
            .is_startup_fault()
        );

        assert!(
            !EaselError::MemoryGrow {
                pages: 2,
                cause: "limit".to_string()
            }
            .is_startup_fault()
        );
    }

    #[test]
    fn with_path_maps_io() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.with_path("/tmp/program.txt").unwrap_err();
        assert_eq!(err.code(), "E901");
        assert!(format!("{}", err).contains("/tmp/program.txt"));
    }
}
