//! Host value representation exposed to the guest.
//!
//! Every value the guest can reference is one of a small set of capability
//! kinds; member access and calls are implemented only for the kinds that
//! support them, resolved once at store time rather than by runtime type
//! inspection on every operation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::buffer::ByteArray;
use crate::error::{CallError, CallResult};

/// Native function implementation behind a shared handle.
pub type NativeFn = Rc<dyn Fn(&[HostValue]) -> CallResult<HostValue>>;

/// A named host function callable from the guest.
///
/// Clones share the same implementation; two callables are the same
/// function exactly when their handles point at the same closure.
#[derive(Clone)]
pub struct Callable {
    name: Rc<str>,
    func: NativeFn,
}

impl Callable {
    /// Wraps a closure as a guest-callable function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[HostValue]) -> CallResult<HostValue> + 'static,
    {
        Callable {
            name: Rc::from(name.into()),
            func: Rc::new(func),
        }
    }

    /// Returns the function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function directly, without the dispatcher's panic guard.
    pub fn invoke(&self, args: &[HostValue]) -> CallResult<HostValue> {
        (self.func)(args)
    }

    /// Returns the identity of the underlying closure.
    pub fn fn_id(&self) -> usize {
        Rc::as_ptr(&self.func) as *const () as usize
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.name)
    }
}

/// A string-keyed object the guest may read and extend freely.
///
/// Missing keys read back as the absent value; writes insert or overwrite.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    entries: Rc<RefCell<HashMap<String, HostValue>>>,
}

impl Mapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<HostValue> {
        self.entries.borrow().get(key).cloned()
    }

    /// Inserts or overwrites `key`.
    pub fn insert(&self, key: impl Into<String>, value: HostValue) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns true if `other` is the same mapping object.
    pub fn same_object(&self, other: &Mapping) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

/// A fixed-schema object: its field names are sealed at construction.
///
/// Reads of unknown fields yield nothing; writes to unknown fields are
/// refused rather than inserting a new key.
#[derive(Clone, Debug)]
pub struct Record {
    fields: Rc<RefCell<HashMap<String, HostValue>>>,
}

impl Record {
    /// Creates a record from its complete set of fields.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, HostValue)>,
    {
        Record {
            fields: Rc::new(RefCell::new(fields.into_iter().collect())),
        }
    }

    /// Returns the value of `field`, if the schema has it.
    pub fn get(&self, field: &str) -> Option<HostValue> {
        self.fields.borrow().get(field).cloned()
    }

    /// Assigns `field`, refusing names outside the schema.
    pub fn set(&self, field: &str, value: HostValue) -> CallResult<()> {
        let mut fields = self.fields.borrow_mut();
        match fields.get_mut(field) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CallError::UnknownField(field.to_string())),
        }
    }

    /// Creates a new record with the same field names, all absent.
    pub fn blank_like(&self) -> Record {
        Record::from_fields(
            self.fields
                .borrow()
                .keys()
                .map(|name| (name.clone(), HostValue::Undefined)),
        )
    }

    /// Returns true if `other` is the same record object.
    pub fn same_object(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.fields, &other.fields)
    }
}

/// Any host value addressable from the guest.
///
/// Numbers and booleans travel inline in the wire encoding; all other
/// kinds are registered in the foreign-object table and referenced by id.
///
/// # Examples
///
/// ```
/// use bridge_types::HostValue;
///
/// let n = HostValue::Number(1.5);
/// assert_eq!(n.kind(), "number");
/// assert!(HostValue::Undefined.is_absent());
/// ```
#[derive(Clone, Debug)]
pub enum HostValue {
    /// No value; decodes from an all-zero wire pattern.
    Undefined,
    /// The null sentinel.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An IEEE-754 double.
    Number(f64),
    /// An immutable string.
    String(Rc<str>),
    /// A string-keyed extensible object.
    Mapping(Mapping),
    /// A fixed-schema object.
    Record(Record),
    /// A shared byte buffer.
    Buffer(ByteArray),
    /// A host function.
    Callable(Callable),
}

impl HostValue {
    /// Builds a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        HostValue::String(Rc::from(s.as_ref()))
    }

    /// Builds a callable value.
    pub fn callable<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[HostValue]) -> CallResult<HostValue> + 'static,
    {
        HostValue::Callable(Callable::new(name, func))
    }

    /// Returns true for the absent value.
    pub fn is_absent(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// Returns the numeric payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the buffer payload, if this is a byte buffer.
    pub fn as_buffer(&self) -> Option<&ByteArray> {
        match self {
            HostValue::Buffer(b) => Some(b),
            _ => None,
        }
    }

    /// Returns a short name for the value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Boolean(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Mapping(_) => "mapping",
            HostValue::Record(_) => "record",
            HostValue::Buffer(_) => "buffer",
            HostValue::Callable(_) => "function",
        }
    }

    /// Looks up a member by name.
    ///
    /// Mappings look up keys, records look up schema fields; every other
    /// kind has no members. `None` means absent, never an error.
    pub fn get_member(&self, name: &str) -> Option<HostValue> {
        match self {
            HostValue::Mapping(m) => m.get(name),
            HostValue::Record(r) => r.get(name),
            _ => None,
        }
    }

    /// Assigns a member by name.
    ///
    /// Mappings insert or overwrite; records assign existing fields only;
    /// every other kind refuses the write.
    pub fn set_member(&self, name: &str, value: HostValue) -> CallResult<()> {
        match self {
            HostValue::Mapping(m) => {
                m.insert(name, value);
                Ok(())
            }
            HostValue::Record(r) => r.set(name, value),
            other => Err(CallError::Unsupported {
                kind: other.kind(),
                operation: "member assignment",
            }),
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Boolean(a), HostValue::Boolean(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Mapping(a), HostValue::Mapping(b)) => a.same_object(b),
            (HostValue::Record(a), HostValue::Record(b)) => a.same_object(b),
            (HostValue::Buffer(a), HostValue::Buffer(b)) => a.same_backing(b),
            (HostValue::Callable(a), HostValue::Callable(b)) => a.fn_id() == b.fn_id(),
            _ => false,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Boolean(b) => write!(f, "{}", b),
            HostValue::Number(n) => write!(f, "{}", n),
            HostValue::String(s) => write!(f, "{}", s),
            HostValue::Mapping(_) => write!(f, "[object]"),
            HostValue::Record(_) => write!(f, "[record]"),
            HostValue::Buffer(b) => write!(f, "[buffer {}]", b.len()),
            HostValue::Callable(c) => write!(f, "[function {}]", c.name()),
        }
    }
}
