//! Host import bindings for guest drawing modules.
//!
//! Provides the `env` namespace imports a guest may declare: the draw
//! channel (`platformClear`, `platformDrawLine`) and both error reporting
//! protocols (`platformError` and `platformErrorStart`/`Push`/`End`).
//!
//! Imports are bound by walking the module's declared import list and
//! registering each recognized name with the signature the guest itself
//! declares. That is how optional color parameters are negotiated: a guest
//! compiled without color support simply declares the shorter signature.

use super::memory::GuestMemory;
use easel_core::color::Color;
use easel_core::command::DrawSink;
use easel_core::error::{EaselError, Result};
use wasmtime::{Caller, Engine, Extern, ExternType, FuncType, Linker, Module, Val, ValType};

/// The import namespace guests declare host functions in.
pub const IMPORT_NAMESPACE: &str = "env";

const CLEAR: &str = "platformClear";
const DRAW_LINE: &str = "platformDrawLine";
const ERROR: &str = "platformError";
const ERROR_START: &str = "platformErrorStart";
const ERROR_PUSH: &str = "platformErrorPush";
const ERROR_END: &str = "platformErrorEnd";

/// Collector for guest error reports.
///
/// Guests pick one of two wire protocols: a single atomic report of a
/// NUL-terminated string, or a streamed sequence of start / push / end
/// calls that the host assembles into one message. Both land here as
/// complete messages in arrival order.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    /// Complete messages received since the last reset.
    messages: Vec<String>,
    /// Buffer for a streamed message between start and end.
    open: Option<String>,
}

impl ErrorChannel {
    /// Discard all recorded messages and any unfinished streamed message.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.open = None;
    }

    /// Record a complete message (the atomic protocol).
    pub fn report(&mut self, message: String) {
        self.messages.push(message);
    }

    /// Open a fresh streamed message, discarding any unfinished one.
    pub fn begin(&mut self) {
        self.open = Some(String::new());
    }

    /// Append a chunk to the streamed message. A push without a prior
    /// begin opens a message implicitly.
    pub fn push_chunk(&mut self, chunk: &str) {
        self.open.get_or_insert_with(String::new).push_str(chunk);
    }

    /// Seal the streamed message into a complete one. Returns the sealed
    /// message, or `None` when no message was open.
    pub fn finish(&mut self) -> Option<&str> {
        let message = self.open.take()?;
        self.messages.push(message);
        self.messages.last().map(String::as_str)
    }

    /// The complete messages received since the last reset.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Drain the complete messages, leaving the channel empty.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Check whether any complete message has been received.
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// State available to host functions while a guest entrypoint runs.
pub struct HostState<S> {
    /// Where draw commands are replayed.
    sink: S,
    /// Where guest error reports are collected.
    errors: ErrorChannel,
}

impl<S: DrawSink> HostState<S> {
    /// Create host state around a sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            errors: ErrorChannel::default(),
        }
    }

    /// The draw sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the draw sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The error channel.
    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    /// Mutable access to the error channel.
    pub fn errors_mut(&mut self) -> &mut ErrorChannel {
        &mut self.errors
    }
}

/// Create a linker with every import the module declares bound.
///
/// Unrecognized imports, and recognized ones with unusable signatures,
/// are startup errors.
pub fn create_linker<S: DrawSink + 'static>(
    engine: &Engine,
    module: &Module,
) -> Result<Linker<HostState<S>>> {
    let mut linker = Linker::new(engine);
    bind_imports(&mut linker, module)?;
    Ok(linker)
}

/// Walk the module's declared imports and bind each recognized name with
/// the guest's own signature.
pub fn bind_imports<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    module: &Module,
) -> Result<()> {
    for import in module.imports() {
        let namespace = import.module();
        let name = import.name();

        let unsupported = || EaselError::UnsupportedImport {
            namespace: namespace.to_string(),
            name: name.to_string(),
        };

        if namespace != IMPORT_NAMESPACE {
            return Err(unsupported());
        }
        let ExternType::Func(ty) = import.ty() else {
            return Err(unsupported());
        };

        match name {
            CLEAR => bind_clear(linker, ty)?,
            DRAW_LINE => bind_draw_line(linker, ty)?,
            ERROR => bind_error(linker, ty)?,
            ERROR_START => bind_error_start(linker, ty)?,
            ERROR_PUSH => bind_error_push(linker, ty)?,
            ERROR_END => bind_error_end(linker, ty)?,
            _ => return Err(unsupported()),
        }
    }

    Ok(())
}

/// `platformClear()` or `platformClear(color)`.
fn bind_clear<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    let params: Vec<ValType> = ty.params().collect();
    if params.len() > 1 || !params.iter().all(is_color_type) || ty.results().len() != 0 {
        return Err(bad_signature(CLEAR, "expected () or (color), no results"));
    }

    register(linker, CLEAR, ty, |mut caller, params, _results| {
        let color = params.first().and_then(color_from_val);
        caller.data_mut().sink.clear(color);
        Ok(())
    })
}

/// `platformDrawLine(x1, y1, x2, y2)` or `platformDrawLine(x1, y1, x2, y2, color)`.
fn bind_draw_line<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    let params: Vec<ValType> = ty.params().collect();
    let arity_ok = params.len() == 4 || params.len() == 5;
    if !arity_ok
        || !params[..4.min(params.len())].iter().all(is_numeric_type)
        || !params.iter().skip(4).all(is_color_type)
        || ty.results().len() != 0
    {
        return Err(bad_signature(
            DRAW_LINE,
            "expected (x1, y1, x2, y2) or (x1, y1, x2, y2, color), no results",
        ));
    }

    register(linker, DRAW_LINE, ty, |mut caller, params, _results| {
        let x1 = number_param(params, 0)?;
        let y1 = number_param(params, 1)?;
        let x2 = number_param(params, 2)?;
        let y2 = number_param(params, 3)?;
        let color = params.get(4).and_then(color_from_val);
        caller.data_mut().sink.draw_line(x1, y1, x2, y2, color);
        Ok(())
    })
}

/// `platformError(ptr)`: the atomic protocol, one NUL-terminated string.
fn bind_error<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    let params: Vec<ValType> = ty.params().collect();
    if params.len() != 1 || !is_pointer_type(&params[0]) || ty.results().len() != 0 {
        return Err(bad_signature(ERROR, "expected (ptr: i32), no results"));
    }

    register(linker, ERROR, ty, |mut caller, params, _results| {
        let ptr = pointer_param(params, 0)?;
        let memory = exported_memory(&mut caller)?;
        let message = GuestMemory::new(memory).read_cstring(&caller, ptr)?;
        tracing::warn!(error = %message, "guest reported error");
        caller.data_mut().errors.report(message);
        Ok(())
    })
}

/// `platformErrorStart()`: open a fresh streamed message.
fn bind_error_start<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    if ty.params().len() != 0 || ty.results().len() != 0 {
        return Err(bad_signature(ERROR_START, "expected no parameters or results"));
    }

    register(linker, ERROR_START, ty, |mut caller, _params, _results| {
        caller.data_mut().errors.begin();
        Ok(())
    })
}

/// `platformErrorPush(ptr, count)`: append bytes to the streamed message.
fn bind_error_push<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    let params: Vec<ValType> = ty.params().collect();
    if params.len() != 2 || !params.iter().all(is_pointer_type) || ty.results().len() != 0 {
        return Err(bad_signature(
            ERROR_PUSH,
            "expected (ptr: i32, count: i32), no results",
        ));
    }

    register(linker, ERROR_PUSH, ty, |mut caller, params, _results| {
        let ptr = pointer_param(params, 0)?;
        let count = pointer_param(params, 1)?;
        let memory = exported_memory(&mut caller)?;
        let chunk = GuestMemory::new(memory).read_range(&caller, ptr, count)?;
        caller.data_mut().errors.push_chunk(&chunk);
        Ok(())
    })
}

/// `platformErrorEnd()`: seal the streamed message.
fn bind_error_end<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    ty: FuncType,
) -> Result<()> {
    if ty.params().len() != 0 || ty.results().len() != 0 {
        return Err(bad_signature(ERROR_END, "expected no parameters or results"));
    }

    register(linker, ERROR_END, ty, |mut caller, _params, _results| {
        let state = caller.data_mut();
        if let Some(message) = state.errors.finish() {
            tracing::warn!(error = %message, "guest reported error");
        }
        Ok(())
    })
}

fn register<S: DrawSink + 'static>(
    linker: &mut Linker<HostState<S>>,
    name: &str,
    ty: FuncType,
    func: impl Fn(Caller<'_, HostState<S>>, &[Val], &mut [Val]) -> anyhow::Result<()>
        + Send
        + Sync
        + 'static,
) -> Result<()> {
    linker
        .func_new(IMPORT_NAMESPACE, name, ty, func)
        .map_err(|e| EaselError::BadSignature {
            name: name.to_string(),
            cause: e.to_string(),
        })?;
    Ok(())
}

fn bad_signature(name: &str, cause: &str) -> EaselError {
    EaselError::BadSignature {
        name: name.to_string(),
        cause: cause.to_string(),
    }
}

/// Coordinates may be declared as any numeric WASM type.
fn is_numeric_type(ty: &ValType) -> bool {
    matches!(
        ty,
        ValType::I32 | ValType::I64 | ValType::F32 | ValType::F64
    )
}

/// Colors are 32-bit RGBA words, declared as an integer type.
fn is_color_type(ty: &ValType) -> bool {
    matches!(ty, ValType::I32 | ValType::I64)
}

/// Pointers and byte counts are 32-bit on wasm32.
fn is_pointer_type(ty: &ValType) -> bool {
    matches!(ty, ValType::I32)
}

fn number_from_val(val: &Val) -> Option<f64> {
    match val {
        Val::I32(v) => Some(f64::from(*v)),
        Val::I64(v) => Some(*v as f64),
        Val::F32(bits) => Some(f64::from(f32::from_bits(*bits))),
        Val::F64(bits) => Some(f64::from_bits(*bits)),
        _ => None,
    }
}

fn color_from_val(val: &Val) -> Option<Color> {
    match val {
        Val::I32(v) => Some(Color::new(*v as u32)),
        Val::I64(v) => Some(Color::new(*v as u32)),
        _ => None,
    }
}

fn number_param(params: &[Val], idx: usize) -> anyhow::Result<f64> {
    params
        .get(idx)
        .and_then(number_from_val)
        .ok_or_else(|| anyhow::anyhow!("parameter {idx} is not numeric"))
}

fn pointer_param(params: &[Val], idx: usize) -> anyhow::Result<u32> {
    match params.get(idx) {
        Some(Val::I32(v)) => Ok(*v as u32),
        _ => Err(anyhow::anyhow!("parameter {idx} is not an i32")),
    }
}

fn exported_memory<S>(caller: &mut Caller<'_, HostState<S>>) -> anyhow::Result<wasmtime::Memory> {
    match caller.get_export("memory") {
        Some(Extern::Memory(m)) => Ok(m),
        _ => Err(anyhow::anyhow!("guest does not export 'memory'")),
    }
}
