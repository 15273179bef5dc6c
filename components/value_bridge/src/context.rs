//! Per-guest bridge state.
//!
//! All mutable bridge state (the foreign-object table, the namespace
//! objects, the exit and resume flags) lives in one context constructed
//! per guest instance. Running several guests means several contexts;
//! nothing here is process-global.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use bridge_types::{CallError, HostValue, Mapping, SinkHandle, StderrSink, StdoutSink};

use crate::ref_table::ForeignTable;

/// Bridge state for one guest instance.
pub struct BridgeContext {
    pub(crate) table: ForeignTable,
    pub(crate) global: Mapping,
    pub(crate) scope: Mapping,
    pub(crate) stdout: SinkHandle,
    pub(crate) stderr: SinkHandle,
    pub(crate) started: Instant,
    pub(crate) exited: Rc<Cell<bool>>,
    pub(crate) exit_code: u32,
    resume_requested: Rc<Cell<bool>>,
}

impl BridgeContext {
    /// Creates a context around the given namespace objects.
    ///
    /// Registers the host-driven resume hook as `_resume` in the scope
    /// object; the guest's scheduling machinery calls it to request
    /// re-entry, and the host driver services the request from outside
    /// the VM between calls.
    pub fn new(global: Mapping, scope: Mapping) -> Self {
        let exited = Rc::new(Cell::new(false));
        let resume_requested = Rc::new(Cell::new(false));

        let hook_exited = exited.clone();
        let hook_resume = resume_requested.clone();
        scope.insert(
            "_resume",
            HostValue::callable("_resume", move |_args| {
                if hook_exited.get() {
                    return Err(CallError::Failed("guest has already exited".to_string()));
                }
                hook_resume.set(true);
                Ok(HostValue::Undefined)
            }),
        );

        BridgeContext {
            table: ForeignTable::new(global.clone(), scope.clone()),
            global,
            scope,
            stdout: Rc::new(StdoutSink),
            stderr: Rc::new(StderrSink),
            started: Instant::now(),
            exited,
            exit_code: 0,
            resume_requested,
        }
    }

    /// Replaces the stdout stream.
    pub fn with_stdout(mut self, sink: SinkHandle) -> Self {
        self.stdout = sink;
        self
    }

    /// Replaces the stderr stream.
    pub fn with_stderr(mut self, sink: SinkHandle) -> Self {
        self.stderr = sink;
        self
    }

    /// Returns the global namespace object (reserved id 5).
    pub fn global(&self) -> &Mapping {
        &self.global
    }

    /// Returns the top-level scope object (reserved id 6).
    pub fn scope(&self) -> &Mapping {
        &self.scope
    }

    /// Returns the foreign-object table.
    pub fn table(&self) -> &ForeignTable {
        &self.table
    }

    /// Returns the foreign-object table for mutation.
    pub fn table_mut(&mut self) -> &mut ForeignTable {
        &mut self.table
    }

    /// True once the guest has signaled termination, either through the
    /// exit operation or by flagging `exited` in its scope object.
    pub fn has_exited(&self) -> bool {
        if self.exited.get() {
            return true;
        }
        matches!(self.scope.get("exited"), Some(HostValue::Boolean(true)))
    }

    /// Returns the exit code recorded by the exit operation.
    pub fn exit_code(&self) -> u32 {
        self.exit_code
    }

    /// Consumes a pending resume request, if the guest filed one.
    pub fn take_resume_request(&mut self) -> bool {
        self.resume_requested.replace(false)
    }
}

impl Default for BridgeContext {
    fn default() -> Self {
        BridgeContext::new(Mapping::new(), Mapping::new())
    }
}
