//! Integration tests for the guest session lifecycle.
//!
//! These tests run real guest modules, built from WAT, through the full
//! host surface: input marshaling, draw command imports, both error
//! reporting protocols, and the update/render split.

use easel_core::testing::RecordingSink;
use easel_core::{Color, DrawCommand, DrawSink, Painter, Surface, Theme};
use easel_host::guest::{GuestRuntime, GuestRuntimeConfig, GuestSession};

/// A guest that accepts programs with exactly four coordinates.
///
/// `update` counts spaces in the input and remembers whether the program
/// was valid; invalid programs are reported through the atomic error
/// protocol. `render` replays a clear and one line from that retained
/// state without touching the input again.
fn drawing_guest() -> Vec<u8> {
    let wat = r#"
        (module
            (import "env" "platformClear" (func $clear))
            (import "env" "platformDrawLine" (func $draw_line (param i32 i32 i32 i32)))
            (import "env" "platformError" (func $error (param i32)))
            (memory (export "memory") 1)
            (global $valid (mut i32) (i32.const 0))
            (data (i32.const 4096) "expected 4 coordinates\00")
            (func (export "update") (param $ptr i32) (param $len i32)
                (local $i i32)
                (local $spaces i32)
                (block $done
                    (loop $scan
                        (br_if $done (i32.ge_u (local.get $i) (local.get $len)))
                        (if (i32.eq
                                (i32.load8_u (i32.add (local.get $ptr) (local.get $i)))
                                (i32.const 32))
                            (then (local.set $spaces
                                (i32.add (local.get $spaces) (i32.const 1)))))
                        (local.set $i (i32.add (local.get $i) (i32.const 1)))
                        (br $scan)))
                (if (i32.eq (local.get $spaces) (i32.const 4))
                    (then (global.set $valid (i32.const 1)))
                    (else
                        (global.set $valid (i32.const 0))
                        (call $error (i32.const 4096)))))
            (func (export "render")
                (if (global.get $valid)
                    (then
                        (call $clear)
                        (call $draw_line
                            (i32.const 0) (i32.const 0)
                            (i32.const 10) (i32.const 10))))))
    "#;
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Reports the same message as [`drawing_guest`], but streamed in two
/// chunks through the start/push/end protocol.
fn streamed_error_guest() -> Vec<u8> {
    let wat = r#"
        (module
            (import "env" "platformErrorStart" (func $err_start))
            (import "env" "platformErrorPush" (func $err_push (param i32 i32)))
            (import "env" "platformErrorEnd" (func $err_end))
            (memory (export "memory") 1)
            (data (i32.const 4096) "expected 4 coordinates")
            (func (export "update") (param i32 i32)
                (call $err_start)
                (call $err_push (i32.const 4096) (i32.const 11))
                (call $err_push (i32.const 4107) (i32.const 11))
                (call $err_end))
            (func (export "render")))
    "#;
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Uses the color-carrying import variants and takes render dimensions.
fn color_guest() -> Vec<u8> {
    let wat = r#"
        (module
            (import "env" "platformClear" (func $clear (param i32)))
            (import "env" "platformDrawLine"
                (func $draw_line (param f64 f64 f64 f64 i32)))
            (memory (export "memory") 1)
            (func (export "update") (param i32 i32))
            (func (export "render") (param $w i32) (param $h i32)
                (call $clear (i32.const 0x336699ff))
                (call $draw_line
                    (f64.const 0) (f64.const 0)
                    (f64.convert_i32_u (local.get $w))
                    (f64.convert_i32_u (local.get $h))
                    (i32.const 0xff0000ff))))
    "#;
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Counts `init` calls and draws the count as the first line coordinate.
fn init_guest() -> Vec<u8> {
    let wat = r#"
        (module
            (import "env" "platformDrawLine" (func $draw_line (param i32 i32 i32 i32)))
            (memory (export "memory") 1)
            (global $inits (mut i32) (i32.const 0))
            (func (export "init")
                (global.set $inits (i32.add (global.get $inits) (i32.const 1))))
            (func (export "update") (param i32 i32))
            (func (export "render")
                (call $draw_line
                    (global.get $inits) (i32.const 0)
                    (i32.const 0) (i32.const 0))))
    "#;
    wat::parse_str(wat).expect("Failed to parse WAT")
}

/// Spins forever inside `update`.
fn spinning_guest() -> Vec<u8> {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "update") (param i32 i32)
                (loop $spin (br $spin)))
            (func (export "render")))
    "#;
    wat::parse_str(wat).expect("Failed to parse WAT")
}

fn recording_session(wasm: &[u8]) -> GuestSession<RecordingSink> {
    let runtime = GuestRuntime::with_defaults().expect("Failed to create runtime");
    let module = runtime.load("guest", wasm).expect("Failed to load module");
    GuestSession::instantiate(&runtime, &module, RecordingSink::new())
        .expect("Failed to instantiate guest")
}

fn painter_session(wasm: &[u8], width: u32, height: u32) -> GuestSession<Painter> {
    let runtime = GuestRuntime::with_defaults().expect("Failed to create runtime");
    let module = runtime.load("guest", wasm).expect("Failed to load module");
    let painter = Painter::new(Surface::new(width, height), Theme::default());
    GuestSession::instantiate(&runtime, &module, painter).expect("Failed to instantiate guest")
}

fn replay(commands: &[DrawCommand], sink: &mut impl DrawSink) {
    for command in commands {
        match *command {
            DrawCommand::Clear { color } => sink.clear(color),
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                color,
            } => sink.draw_line(x1, y1, x2, y2, color),
        }
    }
}

#[test]
fn valid_program_emits_clear_then_line() {
    let mut session = recording_session(&drawing_guest());

    let outcome = session.update("line 0 0 10 10").expect("update failed");
    assert!(outcome.is_valid());
    assert!(session.sink().is_empty(), "update must not draw");

    session.render(64, 64).expect("render failed");
    assert_eq!(
        session.sink().commands(),
        &[
            DrawCommand::Clear { color: None },
            DrawCommand::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                color: None,
            },
        ]
    );
}

#[test]
fn short_program_reports_error_and_draws_nothing() {
    let mut session = recording_session(&drawing_guest());

    let outcome = session.update("line 0 0").expect("update failed");
    assert!(!outcome.is_valid());
    assert_eq!(outcome.errors(), ["expected 4 coordinates"]);

    session.render(64, 64).expect("render failed");
    assert!(session.sink().is_empty());
}

#[test]
fn both_error_protocols_report_identically() {
    let mut atomic = recording_session(&drawing_guest());
    let mut streamed = recording_session(&streamed_error_guest());

    let from_atomic = atomic.update("line 0 0").expect("update failed");
    let from_streamed = streamed.update("line 0 0").expect("update failed");

    assert_eq!(from_atomic.errors(), from_streamed.errors());
    assert_eq!(from_atomic.errors(), ["expected 4 coordinates"]);
}

#[test]
fn errors_reset_between_updates() {
    let mut session = recording_session(&drawing_guest());

    let bad = session.update("line 0 0").expect("update failed");
    assert_eq!(bad.errors().len(), 1);

    let good = session.update("line 0 0 10 10").expect("update failed");
    assert!(good.is_valid());
    assert!(good.errors().is_empty(), "stale errors must not leak");
}

#[test]
fn render_before_update_is_forwarded() {
    let mut session = recording_session(&init_guest());

    // No update has happened; the render call still reaches the guest.
    session.render(64, 64).expect("render failed");
    assert_eq!(
        session.sink().commands(),
        &[DrawCommand::Line {
            x1: 1.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            color: None,
        }]
    );
}

#[test]
fn init_runs_exactly_once() {
    let mut session = recording_session(&init_guest());

    session.update("first").expect("update failed");
    session.render(64, 64).expect("render failed");
    session.update("second").expect("update failed");
    session.render(64, 64).expect("render failed");

    // The drawn x1 is the init count: still 1 after repeated calls.
    let lines: Vec<_> = session.sink().commands().to_vec();
    assert_eq!(lines.len(), 2);
    for command in lines {
        assert_eq!(
            command,
            DrawCommand::Line {
                x1: 1.0,
                y1: 0.0,
                x2: 0.0,
                y2: 0.0,
                color: None,
            }
        );
    }
}

#[test]
fn render_replays_without_reparsing_input() {
    let mut session = recording_session(&drawing_guest());
    session.update("line 0 0 10 10").expect("update failed");

    session.render(64, 64).expect("render failed");
    let first = session.sink_mut().take();

    // Clobber the input region. A replay that re-read it would change.
    let memory = session.memory();
    memory
        .write_input(session.store_mut(), "garbage everywhere")
        .expect("write failed");

    session.render(64, 64).expect("render failed");
    let second = session.sink_mut().take();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn resizing_renders_do_not_retrigger_errors() {
    let mut session = recording_session(&drawing_guest());

    let outcome = session.update("line 0 0").expect("update failed");
    assert!(!outcome.is_valid());

    // Replays at different sizes must not report the parse error again.
    session.render(100, 100).expect("render failed");
    session.render(200, 150).expect("render failed");
    assert!(!session.store_mut().data().errors().has_errors());
}

#[test]
fn same_source_yields_identical_commands() {
    let mut left = recording_session(&drawing_guest());
    let mut right = recording_session(&drawing_guest());

    left.update("line 0 0 10 10").expect("update failed");
    left.render(64, 64).expect("render failed");
    right.update("line 0 0 10 10").expect("update failed");
    right.render(64, 64).expect("render failed");

    assert_eq!(left.sink().commands(), right.sink().commands());
}

#[test]
fn recorded_commands_replay_to_identical_pixels() {
    let mut recorder = recording_session(&drawing_guest());
    recorder.update("line 0 0 10 10").expect("update failed");
    recorder.render(32, 32).expect("render failed");
    let commands = recorder.sink_mut().take();

    let mut replayed = Painter::new(Surface::new(32, 32), Theme::default());
    replay(&commands, &mut replayed);

    let mut direct = painter_session(&drawing_guest(), 32, 32);
    direct.update("line 0 0 10 10").expect("update failed");
    direct.render(32, 32).expect("render failed");

    assert_eq!(replayed.surface().pixels(), direct.sink().surface().pixels());
}

#[test]
fn repeated_render_leaves_pixels_unchanged() {
    let mut session = painter_session(&drawing_guest(), 32, 32);
    session.update("line 0 0 10 10").expect("update failed");

    session.render(32, 32).expect("render failed");
    let first = session.sink().surface().pixels().to_vec();

    session.render(32, 32).expect("render failed");
    assert_eq!(session.sink().surface().pixels(), first.as_slice());
}

#[test]
fn colored_draws_reach_the_sink() {
    let mut session = recording_session(&color_guest());
    session.update("").expect("update failed");
    session.render(64, 48).expect("render failed");

    assert_eq!(
        session.sink().commands(),
        &[
            DrawCommand::Clear {
                color: Some(Color::from(0x336699ff)),
            },
            DrawCommand::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 64.0,
                y2: 48.0,
                color: Some(Color::from(0xff0000ff)),
            },
        ]
    );
}

#[test]
fn runaway_update_is_stopped_by_fuel() {
    let runtime =
        GuestRuntime::new(GuestRuntimeConfig::testing()).expect("Failed to create runtime");
    let module = runtime
        .load("spinner", &spinning_guest())
        .expect("Failed to load module");
    let mut session = GuestSession::instantiate(&runtime, &module, RecordingSink::new())
        .expect("Failed to instantiate guest");

    let err = session.update("anything").unwrap_err();
    assert_eq!(err.code(), "E005");
    assert!(err.is_guest_fault());
}

#[test]
fn large_input_grows_guest_memory() {
    let mut session = recording_session(&drawing_guest());

    // Larger than the guest's single initial memory page.
    let source = format!("line 0 0 10 {}", "1".repeat(100_000));
    let outcome = session.update(&source).expect("update failed");
    assert!(outcome.is_valid());

    session.render(64, 64).expect("render failed");
    assert_eq!(session.sink().line_count(), 1);
}

#[test]
fn module_without_render_is_rejected() {
    let wat = r#"
        (module
            (memory (export "memory") 1)
            (func (export "update") (param i32 i32)))
    "#;
    let wasm = wat::parse_str(wat).expect("Failed to parse WAT");

    let runtime = GuestRuntime::with_defaults().expect("Failed to create runtime");
    let module = runtime.load("no_render", &wasm).expect("Failed to load module");
    match GuestSession::instantiate(&runtime, &module, RecordingSink::new()) {
        Ok(_) => panic!("expected instantiation to fail"),
        Err(err) => assert_eq!(err.code(), "E003"),
    }
}

#[test]
fn foreign_import_namespace_is_rejected() {
    let wat = r#"
        (module
            (import "wasi_snapshot_preview1" "proc_exit" (func (param i32)))
            (memory (export "memory") 1)
            (func (export "update") (param i32 i32))
            (func (export "render")))
    "#;
    let wasm = wat::parse_str(wat).expect("Failed to parse WAT");

    let runtime = GuestRuntime::with_defaults().expect("Failed to create runtime");
    let module = runtime.load("wasi", &wasm).expect("Failed to load module");
    match GuestSession::instantiate(&runtime, &module, RecordingSink::new()) {
        Ok(_) => panic!("expected instantiation to fail"),
        Err(err) => assert_eq!(err.code(), "E004"),
    }
}
