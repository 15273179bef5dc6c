//! Guest-eye-view scenarios.
//!
//! Each test lays out stack frames in a memory image exactly as a
//! compiled guest would and drives the named bridge operations, checking
//! the bytes that come back.

use std::rc::Rc;

use bridge_types::{CaptureSink, HostValue, SinkHandle};
use guest_globals::{default_global, default_scope};
use guest_memory::{MemoryAccessor, VecMemory};
use value_bridge::{decode_value, reserved, BridgeContext, NAN_HEAD};

const SP: u32 = 256;
const SCRATCH: u32 = 1024;
const ARGS: u32 = 2048;

/// A bridge context wired to capture sinks, plus a guest memory image.
fn guest() -> (CaptureSink, BridgeContext, VecMemory) {
    let stdout = CaptureSink::new();
    let out: SinkHandle = Rc::new(stdout.clone());
    let err: SinkHandle = Rc::new(CaptureSink::new());
    let ctx = BridgeContext::new(default_global(out.clone(), err.clone()), default_scope())
        .with_stdout(out)
        .with_stderr(err);
    (stdout, ctx, VecMemory::new(8192))
}

/// Writes a (pointer, length) string pair at `p`, bytes at `at`.
fn put_string(mem: &mut VecMemory, p: u32, at: u32, s: &str) {
    mem.write_from(at, s.as_bytes());
    mem.set_u64(p, at as u64);
    mem.set_u64(p + 8, s.len() as u64);
}

/// Copies an already-encoded wire value from `from` to `to`.
fn copy_value(mem: &mut VecMemory, from: u32, to: u32) {
    let bits = mem.get_u64(from);
    mem.set_u64(to, bits);
}

/// Runs valueGet against `receiver_at` (an encoded wire value) and
/// returns the address of the encoded result.
fn value_get(ctx: &mut BridgeContext, mem: &mut VecMemory, receiver_at: u32, key: &str) -> u32 {
    copy_value(mem, receiver_at, SP + 8);
    put_string(mem, SP + 16, SCRATCH, key);
    ctx.invoke("syscall/js.valueGet", mem, SP);
    SP + 32
}

#[test]
fn test_hello_string_lifecycle() {
    let (_, mut ctx, mut mem) = guest();

    put_string(&mut mem, SP + 8, SCRATCH, "hello");
    ctx.invoke("syscall/js.stringVal", &mut mem, SP);

    let (value, id) = decode_value(&mem, SP + 24, ctx.table());
    assert_eq!(value.as_str(), Some("hello"));
    assert!(id >= 7);

    let id = id as u32;
    assert_eq!(ctx.table().refcount(id), 1);

    mem.set_u32(SP + 8, id);
    ctx.invoke("syscall/js.finalizeRef", &mut mem, SP);

    assert!(ctx.table().resolve(id).is_none());
    assert!(ctx.table().free_pool().contains(&id));
}

#[test]
fn test_value_get_missing_key_yields_null_sentinel() {
    let (_, mut ctx, mut mem) = guest();

    // A reference to the global object (reserved id 5).
    mem.set_u32(512, reserved::GLOBAL);
    mem.set_u32(516, NAN_HEAD | 1);

    let result = value_get(&mut ctx, &mut mem, 512, "doesNotExist");
    assert_eq!(mem.get_u32(result), reserved::NULL);
    assert_eq!(mem.get_u32(result + 4), NAN_HEAD);
    let (value, _) = decode_value(&mem, result, ctx.table());
    assert_eq!(value, HostValue::Null);
}

#[test]
fn test_namespace_walk_to_open_flags() {
    let (_, mut ctx, mut mem) = guest();

    mem.set_u32(512, reserved::GLOBAL);
    mem.set_u32(516, NAN_HEAD | 1);

    let fs_at = value_get(&mut ctx, &mut mem, 512, "fs");
    copy_value(&mut mem, fs_at, 520);
    let constants_at = value_get(&mut ctx, &mut mem, 520, "constants");
    copy_value(&mut mem, constants_at, 528);
    let flag_at = value_get(&mut ctx, &mut mem, 528, "O_WRONLY");

    let (flag, id) = decode_value(&mem, flag_at, ctx.table());
    assert_eq!(flag.as_number(), Some(-1.0));
    assert_eq!(id, -1);
}

#[test]
fn test_buffer_write_pipeline() {
    let (stdout, mut ctx, mut mem) = guest();

    mem.set_u32(512, reserved::GLOBAL);
    mem.set_u32(516, NAN_HEAD | 1);

    // new Uint8Array(5)
    let proto_at = value_get(&mut ctx, &mut mem, 512, "Uint8Array");
    copy_value(&mut mem, proto_at, SP + 8);
    mem.set_u64(ARGS, 5.0f64.to_bits());
    mem.set_u64(SP + 16, ARGS as u64);
    mem.set_u64(SP + 24, 1);
    ctx.invoke("syscall/js.valueNew", &mut mem, SP);
    assert_eq!(mem.get_bytes(SP + 48, 1), vec![1]);
    copy_value(&mut mem, SP + 40, 536);

    // copyBytesToJS(buffer, "hey!!")
    copy_value(&mut mem, 536, SP + 8);
    mem.write_from(SCRATCH, b"hey!!");
    mem.set_u64(SP + 16, SCRATCH as u64);
    mem.set_u64(SP + 24, 5);
    ctx.invoke("syscall/js.copyBytesToJS", &mut mem, SP);
    assert_eq!(mem.get_u64(SP + 40), 5);
    assert_eq!(mem.get_bytes(SP + 48, 1), vec![1]);

    // fs.write(1, buffer, 0, 5, null, null)
    let fs_at = value_get(&mut ctx, &mut mem, 512, "fs");
    copy_value(&mut mem, fs_at, SP + 8);
    put_string(&mut mem, SP + 16, SCRATCH + 256, "write");
    mem.set_u64(ARGS, 1.0f64.to_bits());
    copy_value(&mut mem, 536, ARGS + 8);
    // offset 0 encodes as the zero sentinel
    mem.set_u32(ARGS + 16, reserved::ZERO);
    mem.set_u32(ARGS + 20, NAN_HEAD);
    mem.set_u64(ARGS + 24, 5.0f64.to_bits());
    mem.set_u32(ARGS + 32, reserved::NULL);
    mem.set_u32(ARGS + 36, NAN_HEAD);
    mem.set_u32(ARGS + 40, reserved::NULL);
    mem.set_u32(ARGS + 44, NAN_HEAD);
    mem.set_u64(SP + 32, ARGS as u64);
    mem.set_u64(SP + 40, 6);
    ctx.invoke("syscall/js.valueCall", &mut mem, SP);

    assert_eq!(mem.get_bytes(SP + 64, 1), vec![1]);
    let (written, _) = decode_value(&mem, SP + 56, ctx.table());
    assert_eq!(written.as_number(), Some(5.0));
    assert_eq!(stdout.contents_string(), "hey!!");
}

#[test]
fn test_faulting_call_contained_then_serviced() {
    let (stdout, mut ctx, mut mem) = guest();

    ctx.global().insert(
        "bomb",
        HostValue::callable("bomb", |_| panic!("guest-visible fault")),
    );

    mem.set_u32(512, reserved::GLOBAL);
    mem.set_u32(516, NAN_HEAD | 1);

    copy_value(&mut mem, 512, SP + 8);
    put_string(&mut mem, SP + 16, SCRATCH, "bomb");
    mem.set_u64(SP + 32, ARGS as u64);
    mem.set_u64(SP + 40, 0);
    ctx.invoke("syscall/js.valueCall", &mut mem, SP);

    assert_eq!(mem.get_bytes(SP + 64, 1), vec![0]);
    let (error, _) = decode_value(&mem, SP + 56, ctx.table());
    assert_eq!(error.as_str(), Some("callee panicked: guest-visible fault"));

    // The host still services subsequent operations.
    let fs_at = value_get(&mut ctx, &mut mem, 512, "fs");
    copy_value(&mut mem, fs_at, SP + 8);
    put_string(&mut mem, SP + 16, SCRATCH + 256, "write");
    mem.set_u64(ARGS, 1.0f64.to_bits());
    let buffer = bridge_types::ByteArray::from_vec(b"ok".to_vec());
    value_bridge::encode_value(
        &mut mem,
        ARGS + 8,
        ctx.table_mut(),
        &HostValue::Buffer(buffer),
    );
    mem.set_u32(ARGS + 16, reserved::ZERO);
    mem.set_u32(ARGS + 20, NAN_HEAD);
    mem.set_u64(ARGS + 24, 2.0f64.to_bits());
    mem.set_u64(SP + 32, ARGS as u64);
    mem.set_u64(SP + 40, 4);
    ctx.invoke("syscall/js.valueCall", &mut mem, SP);

    assert_eq!(mem.get_bytes(SP + 64, 1), vec![1]);
    assert_eq!(stdout.contents_string(), "ok");
}

#[test]
fn test_buffer_capacity_clamp_via_ops() {
    let (_, mut ctx, mut mem) = guest();

    mem.set_u32(512, reserved::GLOBAL);
    mem.set_u32(516, NAN_HEAD | 1);

    // new Uint8Array(3), then copy 5 bytes in.
    let proto_at = value_get(&mut ctx, &mut mem, 512, "Uint8Array");
    copy_value(&mut mem, proto_at, SP + 8);
    mem.set_u64(ARGS, 3.0f64.to_bits());
    mem.set_u64(SP + 16, ARGS as u64);
    mem.set_u64(SP + 24, 1);
    ctx.invoke("syscall/js.valueNew", &mut mem, SP);
    copy_value(&mut mem, SP + 40, 536);

    copy_value(&mut mem, 536, SP + 8);
    mem.write_from(SCRATCH, &[1, 2, 3, 4, 5]);
    mem.set_u64(SP + 16, SCRATCH as u64);
    mem.set_u64(SP + 24, 5);
    ctx.invoke("syscall/js.copyBytesToJS", &mut mem, SP);

    assert_eq!(mem.get_u64(SP + 40), 3);
    assert_eq!(mem.get_bytes(SP + 48, 1), vec![1]);

    // A non-buffer destination clears the ok flag.
    put_string(&mut mem, 600, SCRATCH + 128, "plain");
    ctx.invoke("syscall/js.stringVal", &mut mem, 592);
    copy_value(&mut mem, 616, SP + 8);
    ctx.invoke("syscall/js.copyBytesToJS", &mut mem, SP);
    assert_eq!(mem.get_bytes(SP + 48, 1), vec![0]);
}
