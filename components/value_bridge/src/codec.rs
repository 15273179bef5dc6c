//! The 8-byte NaN-boxed wire encoding of host values.
//!
//! A wire value is either a finite non-zero double stored verbatim, or a
//! quiet-NaN bit pattern whose low 32 bits carry an id. Zero and NaN get
//! sentinel ids of their own: their natural bit patterns are the ones the
//! tagged scheme would collide with.

use bridge_types::HostValue;
use guest_memory::MemoryAccessor;

use crate::ref_table::{reserved, ForeignTable};

/// High word of every tagged wire value.
pub const NAN_HEAD: u32 = 0x7FF8_0000;

/// Type tag for generic object references.
const FLAG_OBJECT: u32 = 1;
/// Type tag for string references.
const FLAG_STRING: u32 = 2;
/// Type tag for function references.
const FLAG_FUNCTION: u32 = 4;

fn sentinel(id: u32) -> u64 {
    ((NAN_HEAD as u64) << 32) | id as u64
}

fn reference(flag: u32, id: u32) -> u64 {
    (((NAN_HEAD | flag) as u64) << 32) | id as u64
}

fn type_flag(value: &HostValue) -> u32 {
    match value {
        HostValue::String(_) => FLAG_STRING,
        HostValue::Callable(_) => FLAG_FUNCTION,
        _ => FLAG_OBJECT,
    }
}

/// Writes one wire value at `addr`.
///
/// Numbers and booleans travel inline; strings, callables, and composites
/// are registered in `table` and written as tagged references.
pub fn encode_value(
    mem: &mut dyn MemoryAccessor,
    addr: u32,
    table: &mut ForeignTable,
    value: &HostValue,
) {
    match value {
        HostValue::Undefined | HostValue::Null => mem.set_u64(addr, sentinel(reserved::NULL)),
        HostValue::Boolean(true) => mem.set_u64(addr, sentinel(reserved::TRUE)),
        HostValue::Boolean(false) => mem.set_u64(addr, sentinel(reserved::FALSE)),
        HostValue::Number(n) if n.is_nan() => mem.set_u64(addr, sentinel(reserved::NAN)),
        HostValue::Number(n) if *n == 0.0 => mem.set_u64(addr, sentinel(reserved::ZERO)),
        HostValue::Number(n) => mem.set_u64(addr, n.to_bits()),
        other => {
            let id = table.store(other);
            mem.set_u64(addr, reference(type_flag(other), id));
        }
    }
}

/// Reads one wire value at `addr`.
///
/// Returns the decoded value together with the reference id, or -1 for
/// values that travel inline. An unknown or released id decodes to the
/// absent value and is reported, never a crash.
pub fn decode_value(mem: &dyn MemoryAccessor, addr: u32, table: &ForeignTable) -> (HostValue, i64) {
    let bits = mem.get_u64(addr);
    if bits == 0 {
        return (HostValue::Undefined, -1);
    }
    let number = f64::from_bits(bits);
    if !number.is_nan() {
        return (HostValue::Number(number), -1);
    }
    let id = bits as u32;
    match table.resolve(id) {
        Some(value) => (value, id as i64),
        None => {
            tracing::warn!(id, "wire reference to unknown or released id");
            (HostValue::Undefined, id as i64)
        }
    }
}

/// Reads an array of wire values described by a (pointer u64, length u64)
/// pair at `p`.
pub fn load_value_slice(
    mem: &dyn MemoryAccessor,
    p: u32,
    table: &ForeignTable,
) -> Vec<HostValue> {
    let ptr = mem.get_u64(p) as u32;
    let len = mem.get_u64(p + 8) as usize;
    (0..len)
        .map(|i| decode_value(mem, ptr + (i as u32) * 8, table).0)
        .collect()
}
