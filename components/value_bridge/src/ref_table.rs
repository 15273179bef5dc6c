//! Reference-counted identities for host values referenced from the guest.
//!
//! The guest owns opaque integer handles only; the host owns the values.
//! An id stays valid while its refcount is above zero and is recycled
//! through a free pool once the guest finalizes its last reference.

use std::collections::HashMap;
use std::rc::Rc;

use bridge_types::{HostValue, Mapping};

/// Ids 0 through 6 are permanently reserved and never reclaimed.
pub mod reserved {
    /// The NaN sentinel.
    pub const NAN: u32 = 0;
    /// The numeric zero sentinel.
    pub const ZERO: u32 = 1;
    /// The null sentinel.
    pub const NULL: u32 = 2;
    /// The boolean true sentinel.
    pub const TRUE: u32 = 3;
    /// The boolean false sentinel.
    pub const FALSE: u32 = 4;
    /// The global namespace object.
    pub const GLOBAL: u32 = 5;
    /// The top-level scope object.
    pub const SCOPE: u32 = 6;
}

const FIRST_DYNAMIC_ID: u32 = 7;

/// Identity key used to deduplicate stored values.
///
/// Values comparable by native equality share one id across stores;
/// composite values mint a fresh token per store, so repeated stores of
/// the same mapping or buffer yield distinct ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum DedupKey {
    Str(Rc<str>),
    Bool(bool),
    Bits(u64),
    Func(usize),
    Token(u64),
}

#[derive(Debug)]
struct Slot {
    value: HostValue,
    key: DedupKey,
}

/// The foreign-object table: id assignment, deduplication, refcounts,
/// and id recycling for one guest instance.
#[derive(Debug)]
pub struct ForeignTable {
    values: HashMap<u32, Slot>,
    dedup: HashMap<DedupKey, u32>,
    refcounts: HashMap<u32, u32>,
    free_ids: Vec<u32>,
    next_id: u32,
    next_token: u64,
}

impl ForeignTable {
    /// Creates a table seeded with the reserved sentinel ids and the two
    /// well-known namespace objects.
    pub fn new(global: Mapping, scope: Mapping) -> Self {
        let mut table = ForeignTable {
            values: HashMap::new(),
            dedup: HashMap::new(),
            refcounts: HashMap::new(),
            free_ids: Vec::new(),
            next_id: FIRST_DYNAMIC_ID,
            next_token: 0,
        };
        table.seed(reserved::NAN, HostValue::Number(f64::NAN));
        table.seed(reserved::ZERO, HostValue::Number(0.0));
        table.seed(reserved::NULL, HostValue::Null);
        table.seed(reserved::TRUE, HostValue::Boolean(true));
        table.seed(reserved::FALSE, HostValue::Boolean(false));
        table.seed(reserved::GLOBAL, HostValue::Mapping(global));
        table.seed(reserved::SCOPE, HostValue::Mapping(scope));
        table
    }

    fn seed(&mut self, id: u32, value: HostValue) {
        let key = self.mint_token();
        self.values.insert(id, Slot { value, key });
    }

    fn mint_token(&mut self) -> DedupKey {
        let token = self.next_token;
        self.next_token += 1;
        DedupKey::Token(token)
    }

    fn dedup_key(&mut self, value: &HostValue) -> DedupKey {
        match value {
            HostValue::String(s) => DedupKey::Str(s.clone()),
            HostValue::Boolean(b) => DedupKey::Bool(*b),
            HostValue::Number(n) => DedupKey::Bits(n.to_bits()),
            HostValue::Callable(c) => DedupKey::Func(c.fn_id()),
            HostValue::Undefined
            | HostValue::Null
            | HostValue::Mapping(_)
            | HostValue::Record(_)
            | HostValue::Buffer(_) => self.mint_token(),
        }
    }

    /// Registers `value` and returns its id, bumping the refcount.
    ///
    /// A value already registered under the same identity key reuses its
    /// id; otherwise a reclaimed id is preferred over a fresh one.
    pub fn store(&mut self, value: &HostValue) -> u32 {
        let key = self.dedup_key(value);
        let id = match self.dedup.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.free_ids.pop().unwrap_or_else(|| {
                    let id = self.next_id;
                    self.next_id += 1;
                    id
                });
                self.values.insert(
                    id,
                    Slot {
                        value: value.clone(),
                        key: key.clone(),
                    },
                );
                self.dedup.insert(key, id);
                self.refcounts.insert(id, 0);
                id
            }
        };
        if let Some(count) = self.refcounts.get_mut(&id) {
            *count += 1;
        }
        id
    }

    /// Drops one reference to `id`.
    ///
    /// At zero the value is forgotten and the id joins the free pool.
    /// Releasing a reserved, unknown, or already-dead id is a no-op.
    pub fn release(&mut self, id: u32) {
        let Some(count) = self.refcounts.get_mut(&id) else {
            return;
        };
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            if let Some(slot) = self.values.remove(&id) {
                self.dedup.remove(&slot.key);
            }
            self.refcounts.remove(&id);
            self.free_ids.push(id);
        }
    }

    /// Returns the value registered under `id`, if it is live.
    pub fn resolve(&self, id: u32) -> Option<HostValue> {
        self.values.get(&id).map(|slot| slot.value.clone())
    }

    /// Returns the current refcount of `id` (0 for reserved or dead ids).
    pub fn refcount(&self, id: u32) -> u32 {
        self.refcounts.get(&id).copied().unwrap_or(0)
    }

    /// Returns the ids currently waiting for reuse.
    pub fn free_pool(&self) -> &[u32] {
        &self.free_ids
    }
}

impl Default for ForeignTable {
    fn default() -> Self {
        ForeignTable::new(Mapping::new(), Mapping::new())
    }
}
