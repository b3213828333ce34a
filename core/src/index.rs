//! Name-to-slot index for subcommands.
//!
//! A chained hash table keyed by subcommand name. Each bucket holds its
//! first entry inline and links further entries as boxed overflow nodes,
//! appended at the end of the chain. Lookups compare full names along the
//! whole chain; collisions are resolved by chaining, never by probing.
//!
//! Bucket selection is FNV-1a (32-bit) followed by a mixing step that keeps
//! the low ten bits, reduced into range with a power-of-two mask. Because
//! the mixed hash spans ten bits the table never grows beyond
//! [`MAX_INDEX_CAPACITY`] buckets.

use tracing::trace;

/// Largest bucket count the index will use.
pub const MAX_INDEX_CAPACITY: usize = 1024;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// Hashes a subcommand name.
///
/// The result is not reduced into table range; callers mask it.
///
/// # Examples
///
/// ```
/// use flagscope_core::index::hash_name;
///
/// assert_eq!(hash_name(""), 0x1c5);
/// assert_eq!(hash_name("a"), 0x12c);
/// ```
pub fn hash_name(name: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in name.bytes() {
        hash = (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME);
    }
    hash ^ ((hash >> 10) << 10)
}

#[derive(Debug)]
struct ChainNode<'a> {
    name: &'a str,
    slot: usize,
    next: Option<Box<ChainNode<'a>>>,
}

#[derive(Debug, Default)]
struct Bucket<'a> {
    primary: Option<ChainNode<'a>>,
}

/// Chained hash table from subcommand name to its slot in the registry.
///
/// # Examples
///
/// ```
/// use flagscope_core::index::SubcommandIndex;
///
/// let mut index = SubcommandIndex::with_capacity(64);
/// assert!(index.insert("install", 0));
/// assert!(index.insert("remove", 1));
/// assert!(!index.insert("install", 2));
///
/// assert_eq!(index.get("remove"), Some(1));
/// assert_eq!(index.get("purge"), None);
/// ```
#[derive(Debug)]
pub struct SubcommandIndex<'a> {
    buckets: Vec<Bucket<'a>>,
    len: usize,
    overflow_nodes: usize,
}

impl<'a> SubcommandIndex<'a> {
    /// Creates an empty index.
    ///
    /// `capacity` is rounded up to a power of two and clamped to
    /// `1..=MAX_INDEX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_INDEX_CAPACITY).next_power_of_two();
        Self {
            buckets: empty_buckets(capacity),
            len: 0,
            overflow_nodes: 0,
        }
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of names stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no names are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries living in overflow chain nodes.
    pub fn overflow_nodes(&self) -> usize {
        self.overflow_nodes
    }

    fn bucket_of(&self, name: &str) -> usize {
        hash_name(name) as usize & (self.buckets.len() - 1)
    }

    /// Inserts `name` pointing at `slot`.
    ///
    /// Returns `false` and leaves the index unchanged if `name` is already
    /// present.
    pub fn insert(&mut self, name: &'a str, slot: usize) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        if (self.len + 1) * 4 > self.buckets.len() * 3 && self.buckets.len() < MAX_INDEX_CAPACITY
        {
            self.grow();
        }
        self.push(name, slot);
        true
    }

    fn push(&mut self, name: &'a str, slot: usize) {
        let bucket = self.bucket_of(name);
        let node = ChainNode {
            name,
            slot,
            next: None,
        };
        let primary = &mut self.buckets[bucket].primary;
        if let Some(head) = primary {
            let mut tail = &mut head.next;
            while let Some(next) = tail {
                tail = &mut next.next;
            }
            *tail = Some(Box::new(node));
            self.overflow_nodes += 1;
        } else {
            *primary = Some(node);
        }
        self.len += 1;
    }

    fn grow(&mut self) {
        let capacity = (self.buckets.len() * 2).min(MAX_INDEX_CAPACITY);
        let mut entries = self.entries();
        entries.sort_by_key(|&(_, slot)| slot);

        self.clear();
        self.buckets = empty_buckets(capacity);
        for (name, slot) in entries {
            self.push(name, slot);
        }
        trace!(capacity, entries = self.len, "Grew subcommand index");
    }

    /// Looks up the slot for `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        let mut node = self.buckets[self.bucket_of(name)].primary.as_ref()?;
        loop {
            if node.name == name {
                return Some(node.slot);
            }
            node = node.next.as_deref()?;
        }
    }

    /// Returns every `(name, slot)` pair, bucket by bucket.
    pub fn entries(&self) -> Vec<(&'a str, usize)> {
        let mut out = Vec::with_capacity(self.len);
        for bucket in &self.buckets {
            let mut node = bucket.primary.as_ref();
            while let Some(current) = node {
                out.push((current.name, current.slot));
                node = current.next.as_deref();
            }
        }
        out
    }

    /// Removes every entry and releases each overflow node exactly once.
    ///
    /// Returns the number of overflow nodes released. Chains are unlinked
    /// one node at a time rather than by recursive drop.
    pub fn clear(&mut self) -> usize {
        let mut released = 0;
        for bucket in &mut self.buckets {
            if let Some(head) = bucket.primary.take() {
                let mut next = head.next;
                while let Some(mut node) = next {
                    next = node.next.take();
                    released += 1;
                }
            }
        }
        self.len = 0;
        self.overflow_nodes = 0;
        released
    }
}

fn empty_buckets<'a>(capacity: usize) -> Vec<Bucket<'a>> {
    (0..capacity).map(|_| Bucket::default()).collect()
}
