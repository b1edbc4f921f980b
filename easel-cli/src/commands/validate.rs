//! Validate command - check a guest module and program without rendering.

use anyhow::{Context, Result};
use easel_core::testing::RecordingSink;
use easel_host::guest::{GuestRuntime, GuestSession};
use std::path::Path;

/// Run the validate command.
pub fn run(module: &str, file: &str) -> Result<()> {
    let module_path = Path::new(module);
    if !module_path.exists() {
        anyhow::bail!("Guest module not found: {}", module);
    }

    let file_path = Path::new(file);
    if !file_path.exists() {
        anyhow::bail!("Program file not found: {}", file);
    }

    tracing::info!(module = %module, file = %file, "Validating");

    println!("Validation Results for: {}", file);
    println!("========================{}", "=".repeat(file.len()));
    println!();

    let runtime = GuestRuntime::with_defaults()?;

    let compiled = match runtime.load_file(module_path) {
        Ok(compiled) => compiled,
        Err(e) => {
            println!("✗ MODULE LOAD ERROR:");
            println!("  {}", e);
            anyhow::bail!("Module load failed");
        }
    };
    println!("✓ Module is valid WebAssembly");

    let mut session = match GuestSession::instantiate(&runtime, &compiled, RecordingSink::new()) {
        Ok(session) => session,
        Err(e) => {
            println!("✗ INSTANTIATION ERROR:");
            println!("  {}", e);
            anyhow::bail!("Instantiation failed");
        }
    };
    println!("✓ Exports and imports match the platform contract");
    println!();

    let source = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read program file: {}", file))?;

    let outcome = match session.update(&source) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("✗ GUEST TRAP:");
            println!("  {}", e);
            anyhow::bail!("Guest trapped during update");
        }
    };

    if outcome.is_valid() {
        println!("✓ Program accepted by the guest");
    } else {
        println!("✗ Guest rejected the program:");
        for error in outcome.errors() {
            println!("  - {}", error);
        }
    }

    println!();
    println!("========================{}", "=".repeat(file.len()));

    if outcome.is_valid() {
        println!("✓ Validation PASSED");
        Ok(())
    } else {
        println!("✗ Validation FAILED");
        anyhow::bail!("Guest reported {} error(s)", outcome.errors().len())
    }
}
