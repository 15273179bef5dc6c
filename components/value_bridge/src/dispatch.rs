//! Generic invocation of host callables with panic containment.
//!
//! Failures never cross the guest boundary as panics: the dispatcher
//! returns an explicit result which the call operations translate into
//! an encoded error value and a cleared ok flag.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bridge_types::{ByteArray, CallError, CallResult, Callable, HostValue, Mapping};

/// Resolves `receiver[name]` to a callable.
pub fn resolve_method(receiver: &HostValue, name: &str) -> CallResult<Callable> {
    match receiver.get_member(name) {
        Some(HostValue::Callable(callable)) => Ok(callable),
        Some(_) => Err(CallError::NotCallable(name.to_string())),
        None => Err(CallError::MissingMethod {
            method: name.to_string(),
            target: receiver.kind(),
        }),
    }
}

/// Invokes `callable` with already-decoded arguments.
///
/// An absent argument stands in for the parameter's default value; the
/// callee decides what that is. A panicking callee is contained here and
/// reported as a [`CallError::Panicked`].
pub fn dispatch_call(callable: &Callable, args: &[HostValue]) -> CallResult<HostValue> {
    match panic::catch_unwind(AssertUnwindSafe(|| callable.invoke(args))) {
        Ok(result) => result,
        Err(payload) => Err(CallError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builds a zero-value instance of the same underlying shape as
/// `prototype`.
///
/// Construction parameters are type-specific: a byte buffer takes its
/// length as the first argument, mappings and records take none.
pub fn construct(prototype: &HostValue, args: &[HostValue]) -> CallResult<HostValue> {
    match prototype {
        HostValue::Buffer(_) => {
            let len = match args.first() {
                None | Some(HostValue::Undefined) => 0,
                Some(HostValue::Number(n)) if *n >= 0.0 && *n <= u32::MAX as f64 => *n as usize,
                Some(other) => {
                    return Err(CallError::BadArgument(format!(
                        "buffer length: {}",
                        other
                    )))
                }
            };
            Ok(HostValue::Buffer(ByteArray::new(len)))
        }
        HostValue::Mapping(_) => Ok(HostValue::Mapping(Mapping::new())),
        HostValue::Record(record) => Ok(HostValue::Record(record.blank_like())),
        other => Err(CallError::Unsupported {
            kind: other.kind(),
            operation: "construction",
        }),
    }
}
