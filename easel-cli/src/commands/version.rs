//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("Easel - Sandboxed Canvas Host for WASM Drawing Guests");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  easel-core   Colors, draw commands, surfaces, themes");
    println!("  easel-host   Guest runtime, sessions, reload watching");
    println!("  easel-cli    Command-line interface");
    println!();
    println!("Repository: https://github.com/easel-sh/easel");

    Ok(())
}
