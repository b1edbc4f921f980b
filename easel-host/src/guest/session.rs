//! Guest session lifecycle: instantiate once, then update and render.
//!
//! A session owns the store for one instantiated guest and sequences its
//! entrypoints. `update` marshals program text into guest memory and lets
//! the guest parse it into retained state; `render` replays that state
//! through the draw imports. The two are deliberately decoupled so a
//! presentation change can re-render without re-parsing.

use super::imports::{create_linker, HostState};
use super::memory::GuestMemory;
use super::runtime::GuestRuntime;
use easel_core::command::DrawSink;
use easel_core::error::{EaselError, Result};
use wasmtime::{AsContext, Func, Module, Store, Val, ValType};

/// The result of one `update` call: the guest either accepted the program
/// or reported errors through the error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    errors: Vec<String>,
}

impl UpdateOutcome {
    /// Check whether the guest accepted the program without reporting
    /// errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error messages the guest reported, in arrival order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consume the outcome and keep the error messages.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// One instantiated guest plus the host state it draws into.
///
/// All guest calls are synchronous on the caller's thread; host imports
/// invoked by the guest complete before the entrypoint returns. There is
/// no queueing and no reentrancy.
pub struct GuestSession<S: DrawSink> {
    store: Store<HostState<S>>,
    memory: GuestMemory,
    update_fn: Func,
    update_params: Vec<ValType>,
    render_fn: Func,
    render_params: Vec<ValType>,
    fuel: Option<u64>,
    module_name: String,
}

impl<S: DrawSink + 'static> GuestSession<S> {
    /// Instantiate `module` and run its optional `init` entrypoint once.
    ///
    /// Imports are bound per the module's own declarations; the exports
    /// `memory`, `update` and `render` are required. `update` must take
    /// two numeric parameters, `render` zero or two.
    pub fn instantiate(runtime: &GuestRuntime, module: &Module, sink: S) -> Result<Self> {
        let module_name = module.name().unwrap_or("guest").to_string();
        let mut store = Store::new(runtime.engine(), HostState::new(sink));
        let fuel = runtime.initial_fuel();

        // The start section runs during instantiation, so fuel goes in first.
        if let Some(amount) = fuel {
            set_fuel(&mut store, amount, "instantiate")?;
        }

        let linker = create_linker(runtime.engine(), module)?;
        let instance =
            linker
                .instantiate(&mut store, module)
                .map_err(|e| EaselError::ModuleInstantiate {
                    module: module_name.clone(),
                    cause: e.to_string(),
                })?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| EaselError::MissingExport {
                name: "memory".to_string(),
            })?;

        let update_fn = required_func(&mut store, &instance, "update")?;
        let update_params = entry_params(&store, &update_fn, "update", &[2], "expected (ptr, len)")?;

        let render_fn = required_func(&mut store, &instance, "render")?;
        let render_params = entry_params(
            &store,
            &render_fn,
            "render",
            &[0, 2],
            "expected () or (width, height)",
        )?;

        if let Some(init_fn) = instance.get_func(&mut store, "init") {
            entry_params(&store, &init_fn, "init", &[0], "expected no parameters")?;
            if let Some(amount) = fuel {
                set_fuel(&mut store, amount, "init")?;
            }
            init_fn
                .call(&mut store, &[], &mut [])
                .map_err(|e| EaselError::EntrypointCall {
                    entry: "init".to_string(),
                    cause: e.to_string(),
                })?;
        }

        tracing::debug!(module = %module_name, "guest session instantiated");

        Ok(Self {
            store,
            memory: GuestMemory::new(memory),
            update_fn,
            update_params,
            render_fn,
            render_params,
            fuel,
            module_name,
        })
    }

    /// Hand new program text to the guest.
    ///
    /// Clears the error channel, marshals `source` into the input region
    /// at offset 0 and invokes the guest's `update(ptr, len)`. Messages
    /// the guest reports during the call end up in the outcome; a trap
    /// inside the guest is an `Err` instead.
    pub fn update(&mut self, source: &str) -> Result<UpdateOutcome> {
        tracing::trace!(
            module = %self.module_name,
            bytes = source.len(),
            "updating guest program"
        );

        self.store.data_mut().errors_mut().reset();
        let (ptr, len) = self.memory.write_input(&mut self.store, source)?;

        let args = [
            scalar_arg(&self.update_params[0], ptr, "update")?,
            scalar_arg(&self.update_params[1], len, "update")?,
        ];

        if let Some(amount) = self.fuel {
            set_fuel(&mut self.store, amount, "update")?;
        }
        self.update_fn
            .call(&mut self.store, &args, &mut [])
            .map_err(|e| EaselError::EntrypointCall {
                entry: "update".to_string(),
                cause: e.to_string(),
            })?;

        let errors = self.store.data_mut().errors_mut().take_messages();
        Ok(UpdateOutcome { errors })
    }

    /// Ask the guest to replay its retained program state.
    ///
    /// The surface dimensions are passed if and only if the guest's
    /// `render` declares the two parameters. The input region is not
    /// touched; rendering never re-parses.
    pub fn render(&mut self, width: u32, height: u32) -> Result<()> {
        tracing::trace!(module = %self.module_name, width, height, "rendering guest state");

        let args = if self.render_params.is_empty() {
            Vec::new()
        } else {
            vec![
                scalar_arg(&self.render_params[0], width, "render")?,
                scalar_arg(&self.render_params[1], height, "render")?,
            ]
        };

        if let Some(amount) = self.fuel {
            set_fuel(&mut self.store, amount, "render")?;
        }
        self.render_fn
            .call(&mut self.store, &args, &mut [])
            .map_err(|e| EaselError::EntrypointCall {
                entry: "render".to_string(),
                cause: e.to_string(),
            })
    }

    /// The sink commands are replayed into.
    pub fn sink(&self) -> &S {
        self.store.data().sink()
    }

    /// Mutable access to the sink, e.g. to swap themes or read the
    /// surface back between renders.
    pub fn sink_mut(&mut self) -> &mut S {
        self.store.data_mut().sink_mut()
    }

    /// The guest memory handle, for tests and diagnostics.
    pub fn memory(&self) -> GuestMemory {
        self.memory
    }

    /// Mutable access to the store, paired with [`Self::memory`].
    pub fn store_mut(&mut self) -> &mut Store<HostState<S>> {
        &mut self.store
    }
}

fn required_func<S: DrawSink>(
    store: &mut Store<HostState<S>>,
    instance: &wasmtime::Instance,
    name: &str,
) -> Result<Func> {
    instance
        .get_func(&mut *store, name)
        .ok_or_else(|| EaselError::MissingExport {
            name: name.to_string(),
        })
}

/// Validate an entrypoint signature: an allowed arity, numeric parameters
/// only, no results. Returns the parameter types for argument coercion.
fn entry_params(
    store: impl AsContext,
    func: &Func,
    name: &str,
    arities: &[usize],
    expected: &str,
) -> Result<Vec<ValType>> {
    let ty = func.ty(store);
    let params: Vec<ValType> = ty.params().collect();
    let numeric = params.iter().all(|p| {
        matches!(
            p,
            ValType::I32 | ValType::I64 | ValType::F32 | ValType::F64
        )
    });

    if !arities.contains(&params.len()) || !numeric || ty.results().len() != 0 {
        return Err(EaselError::BadSignature {
            name: name.to_string(),
            cause: expected.to_string(),
        });
    }

    Ok(params)
}

/// Coerce a host-side scalar to the guest's declared parameter type.
fn scalar_arg(ty: &ValType, value: u32, entry: &str) -> Result<Val> {
    match ty {
        ValType::I32 => Ok(Val::I32(value as i32)),
        ValType::I64 => Ok(Val::I64(i64::from(value))),
        ValType::F32 => Ok(Val::F32((value as f32).to_bits())),
        ValType::F64 => Ok(Val::F64(f64::from(value).to_bits())),
        other => Err(EaselError::BadSignature {
            name: entry.to_string(),
            cause: format!("non-numeric parameter type {other}"),
        }),
    }
}

fn set_fuel<T>(store: &mut Store<T>, amount: u64, entry: &str) -> Result<()> {
    store
        .set_fuel(amount)
        .map_err(|e| EaselError::EntrypointCall {
            entry: entry.to_string(),
            cause: format!("Failed to set fuel: {e}"),
        })
}
