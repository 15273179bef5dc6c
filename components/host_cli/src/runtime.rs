//! Runtime orchestration for guest execution.
//!
//! The Runtime instantiates the guest module on the VM, binds every
//! bridge import under the `go` namespace, lays out argv in guest
//! memory, and drives the `run` and `resume` entry points.

use std::rc::Rc;

use bridge_types::{SinkHandle, StderrSink, StdoutSink};
use guest_globals::{default_global, default_scope};
use guest_memory::SliceMemory;
use value_bridge::{BridgeContext, IMPORT_NAMES};
use wasmi::{Caller, Engine, Extern, Instance, Linker, Memory, Module, Store};

use crate::error::{CliError, CliResult};

/// Offset where argv strings are laid out in guest memory.
const ARGV_BASE: usize = 4096;

/// Name of the guest program in argv[0], by convention.
const PROGRAM_NAME: &str = "js";

/// Orchestrates one guest instance: VM store, bridge context, and the
/// entry/resume protocol.
pub struct Runtime {
    store: Store<BridgeContext>,
    instance: Instance,
    memory: Memory,
    argv: Vec<String>,
    max_resumes: u32,
}

impl Runtime {
    /// Loads and instantiates a guest module from a file.
    pub fn from_file(path: &str) -> CliResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Instantiates a guest module with the standard global namespaces
    /// and stdout/stderr streams.
    pub fn from_bytes(bytes: &[u8]) -> CliResult<Self> {
        Self::with_context(bytes, standard_context())
    }

    /// Instantiates a guest module around a caller-supplied bridge
    /// context.
    pub fn with_context(bytes: &[u8], context: BridgeContext) -> CliResult<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, bytes)?;
        let mut store = Store::new(&engine, context);
        let mut linker = Linker::<BridgeContext>::new(&engine);

        for &name in IMPORT_NAMES {
            let bridge_op = name.to_string();
            linker.func_wrap(
                "go",
                name,
                move |mut caller: Caller<'_, BridgeContext>, sp: i32| {
                    let Some(memory) = caller.get_export("mem").and_then(Extern::into_memory)
                    else {
                        tracing::error!(op = %bridge_op, "guest exports no \"mem\" memory");
                        return;
                    };
                    let (data, ctx) = memory.data_and_store_mut(&mut caller);
                    ctx.invoke(&bridge_op, &mut SliceMemory::new(data), sp as u32);
                },
            )?;
        }

        let instance = linker.instantiate(&mut store, &module)?.start(&mut store)?;
        let memory = instance
            .get_memory(&store, "mem")
            .ok_or(CliError::MissingExport("mem"))?;

        Ok(Runtime {
            store,
            instance,
            memory,
            argv: vec![PROGRAM_NAME.to_string()],
            max_resumes: 64,
        })
    }

    /// Appends guest program arguments after the program name.
    pub fn with_args(mut self, args: &[String]) -> Self {
        self.argv.extend(args.iter().cloned());
        self
    }

    /// Caps the resume turns serviced after the entry point returns.
    pub fn with_max_resumes(mut self, max_resumes: u32) -> Self {
        self.max_resumes = max_resumes;
        self
    }

    /// Runs the guest entry point, then services resume requests until
    /// the guest exits, goes quiet, or the resume cap is reached.
    ///
    /// Returns the guest's exit code.
    pub fn run(&mut self) -> CliResult<u32> {
        let (argc, argv_ptr) = self.write_argv()?;
        let entry = self
            .instance
            .get_typed_func::<(i32, i32), ()>(&self.store, "run")?;
        entry.call(&mut self.store, (argc, argv_ptr))?;

        let mut turns = 0;
        while !self.store.data().has_exited() && self.store.data_mut().take_resume_request() {
            if turns >= self.max_resumes {
                tracing::warn!(turns, "resume cap reached, abandoning guest");
                break;
            }
            turns += 1;
            self.resume()?;
        }
        Ok(self.store.data().exit_code())
    }

    /// Re-enters the guest through its resume export.
    ///
    /// Refused once the guest has signaled termination.
    pub fn resume(&mut self) -> CliResult<()> {
        if self.store.data().has_exited() {
            return Err(CliError::GuestExited);
        }
        let resume = self
            .instance
            .get_typed_func::<(), ()>(&self.store, "resume")?;
        resume.call(&mut self.store, ())?;
        Ok(())
    }

    /// Returns the bridge context.
    pub fn context(&self) -> &BridgeContext {
        self.store.data()
    }

    /// Reads a span of guest memory, for inspection.
    pub fn read_memory(&self, offset: usize, len: usize) -> Vec<u8> {
        self.memory.data(&self.store)[offset..offset + len].to_vec()
    }

    /// Writes the argv image: NUL-terminated strings from [`ARGV_BASE`],
    /// 8-aligned, followed by the NULL-terminated pointer array.
    fn write_argv(&mut self) -> CliResult<(i32, i32)> {
        let argv = self.argv.clone();
        let mut offset = ARGV_BASE;
        let mut pointers: Vec<u64> = Vec::new();

        for arg in &argv {
            let mut bytes = arg.clone().into_bytes();
            bytes.push(0);
            self.memory.write(&mut self.store, offset, &bytes)?;
            pointers.push(offset as u64);
            offset += bytes.len();
            if offset % 8 != 0 {
                offset += 8 - offset % 8;
            }
        }
        pointers.push(0);

        let argv_ptr = offset;
        for pointer in pointers {
            self.memory
                .write(&mut self.store, offset, &pointer.to_le_bytes())?;
            offset += 8;
        }

        Ok((argv.len() as i32, argv_ptr as i32))
    }
}

fn standard_context() -> BridgeContext {
    let stdout: SinkHandle = Rc::new(StdoutSink);
    let stderr: SinkHandle = Rc::new(StderrSink);
    BridgeContext::new(
        default_global(stdout.clone(), stderr.clone()),
        default_scope(),
    )
    .with_stdout(stdout)
    .with_stderr(stderr)
}
