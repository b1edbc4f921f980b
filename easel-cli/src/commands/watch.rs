//! Watch command - re-render whenever the program or theme changes.

use anyhow::{Context, Result};
use easel_core::{Painter, Surface, Theme};
use easel_host::guest::{GuestRuntime, GuestSession};
use easel_host::watch::{ReloadKind, ReloadWatcher};
use std::path::Path;
use std::time::Duration;

/// Wait this long after the first event so editor save bursts coalesce.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// The reload roles seen across one burst of filesystem events.
///
/// Editors produce several events per save, and a theme save can land in
/// the same burst as a source save. Coalescing by role instead of by
/// event means duplicates collapse but no role is lost to the other's
/// burst: source still re-parses, style still reloads the theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReloadBatch {
    source: bool,
    style: bool,
}

impl ReloadBatch {
    fn add(&mut self, kind: ReloadKind) {
        match kind {
            ReloadKind::Source => self.source = true,
            ReloadKind::Style => self.style = true,
        }
    }
}

/// Fold a burst of reload events into the set of roles it touched.
fn collect_batch(first: ReloadKind, rest: impl Iterator<Item = ReloadKind>) -> ReloadBatch {
    let mut batch = ReloadBatch::default();
    batch.add(first);
    for kind in rest {
        batch.add(kind);
    }
    batch
}

/// Run the watch command.
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

    tracing::info!(module = %module, file = %file, out = %out, "Starting watch mode");

    let theme_config = match theme {
        Some(path) => Theme::load(path)?,
        None => Theme::default(),
    };

    let runtime = GuestRuntime::with_defaults()?;
    let compiled = runtime.load_file(module_path)?;
    let painter = Painter::new(Surface::new(width, height), theme_config);
    let mut session = GuestSession::instantiate(&runtime, &compiled, painter)?;

    // Initial pass. A startup failure here is fatal; failures inside the
    // watch loop are reported and survived.
    let source = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read program file: {}", file))?;
    let outcome = session.update(&source)?;
    print_guest_errors(outcome.errors());
    session.render(width, height)?;
    session.sink().surface().save_ppm(out)?;
    println!("✓ Wrote {} ({}x{})", out, width, height);

    let mut watcher = ReloadWatcher::new();
    watcher.watch_source(file_path)?;
    if let Some(theme_path) = theme {
        watcher.watch_style(theme_path)?;
    }

    println!();
    println!("Watching: {}", file);
    if let Some(theme_path) = theme {
        println!("Watching: {}", theme_path);
    }
    println!("Press Ctrl+C to stop.");
    println!();

    loop {
        let event = watcher.recv()?;

        // Settle, then drain the burst by role so a theme save arriving
        // during a source save's debounce window is still handled.
        std::thread::sleep(DEBOUNCE);
        let batch = collect_batch(
            event.kind,
            std::iter::from_fn(|| watcher.try_recv().map(|e| e.kind)),
        );

        apply_batch(&mut session, batch, file_path, theme, out, width, height);
    }
}

/// Handle one coalesced burst: reload the theme if the style changed,
/// re-parse if the source changed, then replay and write once.
///
/// Failures are reported and survived, except a host-level update
/// failure, which skips the replay (the retained scene is unchanged, so
/// there is nothing new to write).
fn apply_batch(
    session: &mut GuestSession<Painter>,
    batch: ReloadBatch,
    file: &Path,
    theme: Option<&str>,
    out: &str,
    width: u32,
    height: u32,
) {
    if batch.style {
        if let Some(theme_path) = theme {
            println!("[{} UTC] Theme changed, replaying...", timestamp());

            match Theme::load(theme_path) {
                Ok(reloaded) => session.sink_mut().set_theme(reloaded),
                Err(e) => {
                    eprintln!("Theme reload failed: {}", e);
                    println!("Keeping previous theme.");
                }
            }
        }
    }

    if batch.source {
        println!("[{} UTC] Program changed, reloading...", timestamp());

        let source = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Failed to read {}: {}", file.display(), e);
                return;
            }
        };

        match session.update(&source) {
            // The guest keeps its previous scene; replay it below.
            Ok(outcome) => print_guest_errors(outcome.errors()),
            Err(e) => {
                eprintln!("Update failed: {}", e);
                return;
            }
        }
    }

    refresh(session, out, width, height);
}

/// Replay the retained scene and write it out, surviving failures.
fn refresh(session: &mut GuestSession<Painter>, out: &str, width: u32, height: u32) {
    let result = session
        .render(width, height)
        .and_then(|_| session.sink().surface().save_ppm(out));

    match result {
        Ok(()) => println!("✓ Wrote {}", out),
        Err(e) => eprintln!("Render failed: {}", e),
    }
}

fn print_guest_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("✗ Guest rejected the program:");
    for error in errors {
        println!("  - {}", error);
    }
}

/// Current UTC time as hh:mm:ss, for reload log lines.
fn timestamp() -> String {
    use std::time::SystemTime;

    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();

    let secs = now.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Color;
    use std::fs;

    /// A guest whose `update` accepts anything and whose `render` clears
    /// with the theme background, so theme changes show up in pixels.
    fn clearing_session() -> GuestSession<Painter> {
        let wat = r#"
            (module
                (import "env" "platformClear" (func $clear))
                (memory (export "memory") 1)
                (func (export "update") (param i32 i32))
                (func (export "render") (call $clear)))
        "#;
        let wasm = wat::parse_str(wat).expect("Failed to parse WAT");
        let runtime = GuestRuntime::with_defaults().expect("Failed to create runtime");
        let module = runtime.load("clearer", &wasm).expect("Failed to load module");
        let painter = Painter::new(Surface::new(4, 4), Theme::default());
        GuestSession::instantiate(&runtime, &module, painter).expect("Failed to instantiate guest")
    }

    #[test]
    fn batch_keeps_both_roles_from_a_mixed_burst() {
        let batch = collect_batch(
            ReloadKind::Source,
            vec![ReloadKind::Source, ReloadKind::Style].into_iter(),
        );
        assert!(batch.source);
        assert!(batch.style);
    }

    #[test]
    fn batch_coalesces_duplicates() {
        let batch = collect_batch(
            ReloadKind::Style,
            vec![ReloadKind::Style, ReloadKind::Style].into_iter(),
        );
        assert_eq!(
            batch,
            ReloadBatch {
                source: false,
                style: true,
            }
        );
    }

    #[test]
    fn mixed_burst_applies_theme_and_source_together() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scene.txt");
        let theme_file = dir.path().join("theme.yaml");
        let out = dir.path().join("out.ppm");
        fs::write(&source, "line 0 0 10 10").unwrap();
        fs::write(
            &theme_file,
            "background: \"#336699ff\"\nforeground: \"#000000ff\"\n",
        )
        .unwrap();

        let mut session = clearing_session();
        session.update("line 0 0 10 10").unwrap();
        session.render(4, 4).unwrap();
        assert_eq!(session.sink().surface().pixel(0, 0), Some(Color::WHITE));

        // A source event whose debounce window swallowed a style event.
        let batch = collect_batch(ReloadKind::Source, std::iter::once(ReloadKind::Style));
        apply_batch(
            &mut session,
            batch,
            &source,
            theme_file.to_str(),
            out.to_str().unwrap(),
            4,
            4,
        );

        assert_eq!(
            session.sink().surface().pixel(0, 0),
            Some(Color::new(0x3366_99ff)),
            "the style half of the burst must not be dropped"
        );
        assert!(out.exists(), "the replay must be written out");
    }

    #[test]
    fn style_only_batch_replays_with_the_new_theme() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scene.txt");
        let theme_file = dir.path().join("theme.yaml");
        let out = dir.path().join("out.ppm");
        fs::write(&source, "line 0 0 10 10").unwrap();
        fs::write(
            &theme_file,
            "background: \"#111111ff\"\nforeground: \"#eeeeeeff\"\n",
        )
        .unwrap();

        let mut session = clearing_session();
        session.update("line 0 0 10 10").unwrap();
        session.render(4, 4).unwrap();

        let batch = collect_batch(ReloadKind::Style, std::iter::empty());
        apply_batch(
            &mut session,
            batch,
            &source,
            theme_file.to_str(),
            out.to_str().unwrap(),
            4,
            4,
        );

        assert_eq!(
            session.sink().surface().pixel(0, 0),
            Some(Color::new(0x1111_11ff))
        );
    }

    #[test]
    fn unreadable_source_keeps_the_previous_scene() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.txt");
        let out = dir.path().join("out.ppm");

        let mut session = clearing_session();
        session.update("line 0 0 10 10").unwrap();
        session.render(4, 4).unwrap();
        let before = session.sink().surface().pixels().to_vec();

        let batch = collect_batch(ReloadKind::Source, std::iter::empty());
        apply_batch(&mut session, batch, &missing, None, out.to_str().unwrap(), 4, 4);

        assert_eq!(session.sink().surface().pixels(), before.as_slice());
        assert!(!out.exists(), "a failed reload must not write output");
    }
}
