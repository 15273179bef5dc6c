//! The `fs` namespace stub.

use bridge_types::{CallError, HostValue, Mapping, Record, SinkHandle, StreamSink};

/// Open-flag constants the guest's runtime probes at startup.
///
/// All -1: no real filesystem backs them.
const OPEN_FLAGS: &[&str] = &[
    "O_WRONLY", "O_RDWR", "O_CREAT", "O_TRUNC", "O_APPEND", "O_EXCL",
];

const STUBS: &[&str] = &[
    "chmod",
    "chown",
    "close",
    "fchmod",
    "fchown",
    "fstat",
    "fsync",
    "ftruncate",
    "lchown",
    "link",
    "lstat",
    "mkdir",
    "open",
    "read",
    "readdir",
    "readlink",
    "rename",
    "rmdir",
    "stat",
    "symlink",
    "truncate",
    "unlink",
    "utimes",
];

/// Builds the `fs` namespace.
///
/// `write` forwards to the given stream sinks; everything else is a
/// logged no-op.
pub fn fs_namespace(stdout: SinkHandle, stderr: SinkHandle) -> Mapping {
    let fs = Mapping::new();

    // write(fd, buf, offset, length, position, callback)
    fs.insert(
        "write",
        HostValue::callable("write", move |args| {
            let fd = args
                .first()
                .and_then(HostValue::as_number)
                .ok_or_else(|| CallError::BadArgument("write: fd must be a number".to_string()))?;
            let buf = args
                .get(1)
                .and_then(HostValue::as_buffer)
                .ok_or_else(|| CallError::BadArgument("write: buf must be a buffer".to_string()))?;
            let offset = args
                .get(2)
                .and_then(HostValue::as_number)
                .unwrap_or_default() as usize;
            let length = args
                .get(3)
                .and_then(HostValue::as_number)
                .map(|n| n as usize)
                .unwrap_or_else(|| buf.len());

            let data = buf.read_range(offset, length);
            match fd as u64 {
                1 => stdout.write(&data),
                2 => stderr.write(&data),
                other => {
                    tracing::warn!(fd = other, "fs.write to unmapped fd dropped");
                    return Err(CallError::BadArgument(format!("write: bad fd {}", other)));
                }
            }
            Ok(HostValue::Number(data.len() as f64))
        }),
    );

    for &name in STUBS {
        fs.insert(name, unimplemented_stub(name));
    }

    fs.insert(
        "constants",
        HostValue::Record(Record::from_fields(
            OPEN_FLAGS
                .iter()
                .map(|flag| (flag.to_string(), HostValue::Number(-1.0))),
        )),
    );

    fs
}

fn unimplemented_stub(name: &'static str) -> HostValue {
    HostValue::callable(name, move |_args| {
        tracing::debug!(call = name, "unimplemented fs call");
        Ok(HostValue::Undefined)
    })
}
