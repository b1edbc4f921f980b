//! Render command - one-shot render of a drawing program to an image.

use anyhow::{Context, Result};
use easel_core::{Painter, Surface, Theme};
use easel_host::guest::{GuestRuntime, GuestSession};
use std::path::Path;

/// Run the render command.
pub fn run(
    module: &str,
    file: &str,
    out: &str,
    width: u32,
    height: u32,
    theme: Option<&str>,
) -> Result<()> {
    let module_path = Path::new(module);
    if !module_path.exists() {
        anyhow::bail!("Guest module not found: {}", module);
    }

    let file_path = Path::new(file);
    if !file_path.exists() {
        anyhow::bail!("Program file not found: {}", file);
    }

    tracing::info!(module = %module, file = %file, out = %out, "Rendering");

    let theme = match theme {
        Some(path) => Theme::load(path)?,
        None => Theme::default(),
    };

    let runtime = GuestRuntime::with_defaults()?;
    let compiled = runtime.load_file(module_path)?;
    let painter = Painter::new(Surface::new(width, height), theme);
    let mut session = GuestSession::instantiate(&runtime, &compiled, painter)?;

    let source = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read program file: {}", file))?;

    let outcome = session.update(&source)?;
    if !outcome.is_valid() {
        println!("✗ Guest rejected the program:");
        for error in outcome.errors() {
            println!("  - {}", error);
        }
        anyhow::bail!("Guest reported {} error(s)", outcome.errors().len());
    }

    session.render(width, height)?;
    session.sink().surface().save_ppm(out)?;

    println!("✓ Wrote {} ({}x{})", out, width, height);
    Ok(())
}
