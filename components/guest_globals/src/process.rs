//! The `process` namespace stub.

use bridge_types::{HostValue, Mapping};

const STUBS: &[&str] = &[
    "getuid", "getgid", "geteuid", "getegid", "getgroups", "umask", "cwd", "chdir",
];

/// Builds the `process` namespace: placeholder ids and logged no-ops.
pub fn process_namespace() -> Mapping {
    let process = Mapping::new();
    process.insert("pid", HostValue::Number(-1.0));
    process.insert("ppid", HostValue::Number(-1.0));
    for &name in STUBS {
        process.insert(
            name,
            HostValue::callable(name, move |_args| {
                tracing::debug!(call = name, "unimplemented process call");
                Ok(HostValue::Undefined)
            }),
        );
    }
    process
}
