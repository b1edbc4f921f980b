//! WASM runtime management using Wasmtime.
//!
//! Provides engine configuration and guest module loading for the
//! drawing sessions built on top.

use easel_core::error::{EaselError, Result};
use std::path::Path;
use wasmtime::{Config, Engine, Module};

/// Default fuel budget per entrypoint call.
const DEFAULT_FUEL: u64 = 10_000_000;

/// Configuration for the guest runtime.
#[derive(Debug, Clone)]
pub struct GuestRuntimeConfig {
    /// Whether to enable fuel-based execution limiting.
    pub fuel_enabled: bool,
    /// Fuel budget granted to each entrypoint call when fuel is enabled.
    pub fuel_amount: u64,
    /// Enable debug info in compiled modules.
    pub debug_info: bool,
}

impl Default for GuestRuntimeConfig {
    fn default() -> Self {
        Self {
            fuel_enabled: true,
            fuel_amount: DEFAULT_FUEL,
            debug_info: false,
        }
    }
}

impl GuestRuntimeConfig {
    /// Create a configuration for testing with a stricter fuel budget.
    pub fn testing() -> Self {
        Self {
            fuel_enabled: true,
            fuel_amount: 1_000_000,
            debug_info: true,
        }
    }

    /// Enable or disable fuel-based limiting.
    pub fn with_fuel(mut self, enabled: bool, amount: u64) -> Self {
        self.fuel_enabled = enabled;
        self.fuel_amount = amount;
        self
    }

    /// Enable or disable debug info.
    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.debug_info = enabled;
        self
    }

    /// Create a Wasmtime Config from this configuration.
    fn to_wasmtime_config(&self) -> Config {
        let mut config = Config::new();

        // Enable fuel consumption for execution limiting
        config.consume_fuel(self.fuel_enabled);

        // Enable debug info if requested
        config.debug_info(self.debug_info);

        // Use Cranelift for compilation
        config.strategy(wasmtime::Strategy::Cranelift);

        config
    }
}

/// Guest runtime wrapping the Wasmtime engine.
pub struct GuestRuntime {
    /// The Wasmtime engine.
    engine: Engine,
    /// Configuration for this runtime.
    config: GuestRuntimeConfig,
}

impl GuestRuntime {
    /// Create a new guest runtime with the given configuration.
    pub fn new(config: GuestRuntimeConfig) -> Result<Self> {
        let wasmtime_config = config.to_wasmtime_config();
        let engine = Engine::new(&wasmtime_config).map_err(|e| EaselError::ModuleLoad {
            module: "engine".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self { engine, config })
    }

    /// Create a new runtime with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(GuestRuntimeConfig::default())
    }

    /// Get the Wasmtime engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get the runtime configuration.
    pub fn config(&self) -> &GuestRuntimeConfig {
        &self.config
    }

    /// Compile guest module bytes.
    pub fn load(&self, name: &str, wasm_bytes: &[u8]) -> Result<Module> {
        let module = Module::new(&self.engine, wasm_bytes).map_err(|e| EaselError::ModuleLoad {
            module: name.to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(module = name, "compiled guest module");
        Ok(module)
    }

    /// Compile a guest module from a file.
    pub fn load_file(&self, path: &Path) -> Result<Module> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        let wasm_bytes = std::fs::read(path).map_err(|e| EaselError::ModuleLoad {
            module: name.to_string(),
            cause: e.to_string(),
        })?;

        self.load(name, &wasm_bytes)
    }

    /// Validate guest module bytes without keeping the compilation.
    pub fn validate(&self, wasm_bytes: &[u8]) -> Result<()> {
        Module::validate(&self.engine, wasm_bytes).map_err(|e| EaselError::ModuleLoad {
            module: "validation".to_string(),
            cause: e.to_string(),
        })
    }

    /// Get the fuel budget for each entrypoint call.
    pub fn initial_fuel(&self) -> Option<u64> {
        if self.config.fuel_enabled {
            Some(self.config.fuel_amount)
        } else {
            None
        }
    }
}
