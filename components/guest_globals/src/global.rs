//! Assembly of the guest's global and scope objects.

use bridge_types::{ByteArray, HostValue, Mapping, SinkHandle};

use crate::fs::fs_namespace;
use crate::process::process_namespace;

/// Builds the global namespace object the guest resolves at startup:
/// `fs`, `process`, and the byte-buffer constructor.
pub fn default_global(stdout: SinkHandle, stderr: SinkHandle) -> Mapping {
    let global = Mapping::new();
    global.insert("fs", HostValue::Mapping(fs_namespace(stdout, stderr)));
    global.insert("process", HostValue::Mapping(process_namespace()));
    // Construction prototype: a new instance takes its length argument.
    global.insert("Uint8Array", HostValue::Buffer(ByteArray::new(0)));
    global
}

/// Builds the top-level scope object. Starts empty; the guest populates
/// it (`exited`, `_pendingEvent`, ...) and the bridge adds its resume
/// hook.
pub fn default_scope() -> Mapping {
    Mapping::new()
}
