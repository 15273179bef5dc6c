//! The named bridge operations.
//!
//! Every operation receives a single stack-pointer address and reads its
//! arguments from fixed offsets off that pointer; results go back into
//! guest memory the same way. The offsets mirror the frame layout guest
//! toolchains compile against and must be preserved bit for bit.

use bridge_types::{HostValue, StreamSink};
use guest_memory::MemoryAccessor;

use crate::codec::{decode_value, encode_value, load_value_slice};
use crate::context::BridgeContext;
use crate::dispatch::{construct, dispatch_call, resolve_method};

/// Names the guest module imports, in the order its toolchain binds them.
pub const IMPORT_NAMES: &[&str] = &[
    "runtime.wasmExit",
    "runtime.wasmWrite",
    "runtime.resetMemoryDataView",
    "runtime.nanotime1",
    "runtime.walltime1",
    "runtime.scheduleTimeoutEvent",
    "runtime.clearTimeoutEvent",
    "runtime.getRandomData",
    "syscall/js.finalizeRef",
    "syscall/js.stringVal",
    "syscall/js.valueGet",
    "syscall/js.valueSet",
    "syscall/js.valueDelete",
    "syscall/js.valueIndex",
    "syscall/js.valueSetIndex",
    "syscall/js.valueCall",
    "syscall/js.valueInvoke",
    "syscall/js.valueNew",
    "syscall/js.valueLength",
    "syscall/js.valuePrepareString",
    "syscall/js.valueLoadString",
    "syscall/js.valueInstanceOf",
    "syscall/js.copyBytesToGo",
    "syscall/js.copyBytesToJS",
    "debug",
];

impl BridgeContext {
    /// Runs the bridge operation `name` against a stack frame at `sp`.
    ///
    /// Unsupported names are logged and left as no-ops; the guest
    /// continues.
    pub fn invoke(&mut self, name: &str, mem: &mut dyn MemoryAccessor, sp: u32) {
        match name {
            "runtime.wasmExit" => self.wasm_exit(mem, sp),
            "runtime.wasmWrite" => self.wasm_write(mem, sp),
            "runtime.nanotime1" => self.nanotime(mem, sp),
            "runtime.walltime1" => self.walltime(mem, sp),
            "syscall/js.finalizeRef" => self.finalize_ref(mem, sp),
            "syscall/js.stringVal" => self.string_val(mem, sp),
            "syscall/js.valueGet" => self.value_get(mem, sp),
            "syscall/js.valueSet" => self.value_set(mem, sp),
            "syscall/js.valueCall" => self.value_call(mem, sp),
            "syscall/js.valueNew" => self.value_new(mem, sp),
            "syscall/js.copyBytesToJS" => self.copy_bytes_to_js(mem, sp),
            "debug" => self.debug(mem, sp),
            "runtime.resetMemoryDataView"
            | "runtime.scheduleTimeoutEvent"
            | "runtime.clearTimeoutEvent"
            | "runtime.getRandomData"
            | "syscall/js.valueDelete"
            | "syscall/js.valueIndex"
            | "syscall/js.valueSetIndex"
            | "syscall/js.valueInvoke"
            | "syscall/js.valueLength"
            | "syscall/js.valuePrepareString"
            | "syscall/js.valueLoadString"
            | "syscall/js.valueInstanceOf"
            | "syscall/js.copyBytesToGo" => {
                tracing::debug!(op = name, sp, "placeholder bridge operation");
            }
            other => {
                tracing::warn!(op = other, sp, "unsupported bridge operation");
            }
        }
    }

    /// Records the guest's exit code and marks it terminated.
    fn wasm_exit(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let code = mem.get_u32(sp + 8);
        self.exit_code = code;
        self.exited.set(true);
        tracing::info!(code, "guest exited");
    }

    /// Raw passthrough write to one of the standard streams.
    fn wasm_write(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let fd = mem.get_u64(sp + 8);
        let ptr = mem.get_u64(sp + 16) as u32;
        let len = mem.get_u32(sp + 24) as usize;
        let data = mem.get_bytes(ptr, len);
        match fd {
            1 => self.stdout.write(&data),
            2 => self.stderr.write(&data),
            other => tracing::warn!(fd = other, len, "write to unmapped fd dropped"),
        }
    }

    /// Monotonic clock sample in nanoseconds since bridge start.
    fn nanotime(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let nanos = self.started.elapsed().as_nanos() as u64;
        mem.set_u64(sp + 8, nanos);
    }

    /// Wall clock sample as (seconds, nanosecond remainder).
    fn walltime(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        mem.set_u64(sp + 8, now.as_secs());
        mem.set_u32(sp + 16, now.subsec_nanos());
    }

    /// Drops the guest's reference to an id.
    fn finalize_ref(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let id = mem.get_u32(sp + 8);
        self.table.release(id);
    }

    /// Registers a guest string and hands back its reference.
    fn string_val(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let s = mem.load_string(sp + 8);
        encode_value(mem, sp + 24, &mut self.table, &HostValue::string(s));
    }

    /// Member lookup; a missing member yields the absent value.
    fn value_get(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let (receiver, _) = decode_value(mem, sp + 8, &self.table);
        let key = mem.load_string(sp + 16);
        let result = receiver.get_member(&key).unwrap_or(HostValue::Undefined);
        encode_value(mem, sp + 32, &mut self.table, &result);
    }

    /// Member assignment.
    fn value_set(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let (receiver, _) = decode_value(mem, sp + 8, &self.table);
        let key = mem.load_string(sp + 16);
        // In this frame layout the second load of the receiver slot
        // carries the stored value.
        let (value, _) = decode_value(mem, sp + 8, &self.table);
        if let Err(err) = receiver.set_member(&key, value) {
            tracing::warn!(%key, %err, "member assignment refused");
        }
    }

    /// Method call: resolve `receiver[method]`, marshal the arguments,
    /// invoke, and write the result plus an ok flag.
    fn value_call(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let (receiver, _) = decode_value(mem, sp + 8, &self.table);
        let method = mem.load_string(sp + 16);
        let args = load_value_slice(mem, sp + 32, &self.table);
        let outcome =
            resolve_method(&receiver, &method).and_then(|callable| dispatch_call(&callable, &args));
        match outcome {
            Ok(result) => {
                encode_value(mem, sp + 56, &mut self.table, &result);
                mem.set_u8(sp + 64, 1);
            }
            Err(err) => {
                tracing::debug!(%method, %err, "guest call failed");
                let error = HostValue::string(err.to_string());
                encode_value(mem, sp + 56, &mut self.table, &error);
                mem.set_u8(sp + 64, 0);
            }
        }
    }

    /// Construction: allocate a zero-value instance of the referenced
    /// value's shape.
    fn value_new(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let (prototype, _) = decode_value(mem, sp + 8, &self.table);
        let args = load_value_slice(mem, sp + 16, &self.table);
        match construct(&prototype, &args) {
            Ok(instance) => {
                encode_value(mem, sp + 40, &mut self.table, &instance);
                mem.set_u8(sp + 48, 1);
            }
            Err(err) => {
                tracing::debug!(kind = prototype.kind(), %err, "construction failed");
                let error = HostValue::string(err.to_string());
                encode_value(mem, sp + 40, &mut self.table, &error);
                mem.set_u8(sp + 48, 0);
            }
        }
    }

    /// Bulk copy from guest memory into a host byte buffer, bounded by
    /// the destination's capacity.
    fn copy_bytes_to_js(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let (destination, _) = decode_value(mem, sp + 8, &self.table);
        let src = mem.load_bytes(sp + 16);
        match destination.as_buffer() {
            Some(buffer) => {
                let written = buffer.copy_from(&src);
                mem.set_u64(sp + 40, written as u64);
                mem.set_u8(sp + 48, 1);
            }
            None => {
                tracing::warn!(kind = destination.kind(), "byte copy into non-buffer");
                mem.set_u8(sp + 48, 0);
            }
        }
    }

    /// Diagnostic passthrough to the stderr stream.
    fn debug(&mut self, mem: &mut dyn MemoryAccessor, sp: u32) {
        let message = mem.load_string(sp + 8);
        self.stderr.write(format!("debug: {}\n", message).as_bytes());
    }
}
