//! ChainedHashMap: separate-chaining table over a power-of-two bucket array.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::{new_key_type, SlotMap};

use crate::reentrancy::ReentryFlag;

/// Bucket count of a freshly constructed map. Must stay a power of two:
/// index derivation masks with `capacity - 1` instead of taking a modulo.
const DEFAULT_CAPACITY: usize = 16;

/// Occupancy fraction above which the bucket array doubles.
const LOAD_FACTOR: f64 = 0.75;

new_key_type! {
    /// Arena key identifying one chain node.
    struct NodeKey;
}

/// One stored entry. The full hash is computed once at insertion and reused
/// for every chain scan and for redistribution on growth; `K: Hash` is never
/// invoked again for a live node.
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Option<NodeKey>,
}

/// A hash map resolving collisions by separate chaining.
///
/// Buckets hold the heads of singly-linked chains; the nodes themselves live
/// in a slotmap arena, so every node has exactly one owner at all times (its
/// predecessor's `next` link or a bucket head) and unlinking transfers the
/// node to the arena removal in the same step.
///
/// The map is single-threaded (`!Send + !Sync`) and deliberately does not
/// implement `Clone`; a map owns its nodes exclusively.
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    /// Chain heads; `buckets.len()` is the capacity, always a power of two.
    buckets: Vec<Option<NodeKey>>,
    /// Owns every chain node. `nodes.len()` is the live entry count.
    nodes: SlotMap<NodeKey, Node<K, V>>,
    hasher: S,
    reentrancy: ReentryFlag,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty map with the default capacity of 16 buckets.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    // Not public: the hasher is not a configuration knob. Tests use this to
    // pin deterministic hash functions for collision scenarios.
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self {
            buckets: vec![None; DEFAULT_CAPACITY],
            nodes: SlotMap::with_key(),
            hasher,
            reentrancy: ReentryFlag::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Valid only while `capacity` is a power of two.
    #[inline]
    fn bucket_index(hash: u64, capacity: usize) -> usize {
        (hash as usize) & (capacity - 1)
    }

    /// Element count above which the next new-key insertion grows the table.
    /// Derived from capacity on demand, never stored; the product truncates
    /// (capacity 16 -> 12, 32 -> 24, 64 -> 48).
    pub(crate) fn threshold(&self) -> usize {
        (self.buckets.len() as f64 * LOAD_FACTOR) as usize
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Scans the chain for `key`, comparing the cached hash before the key.
    fn find_node<Q>(&self, hash: u64, key: &Q) -> Option<NodeKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = self.buckets[Self::bucket_index(hash, self.buckets.len())];
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            if node.hash == hash && node.key.borrow() == key {
                return Some(k);
            }
            cursor = node.next;
        }
        None
    }

    /// Returns a reference to the value stored for `key`, or `None` if the
    /// key is absent. Absence is an expected outcome, not an error.
    ///
    /// Average O(1); degrades to O(chain length) under collisions.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(key);
        let k = self.find_node(hash, key)?;
        self.nodes.get(k).map(|node| &node.value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(key);
        let k = self.find_node(hash, key)?;
        self.nodes.get_mut(k).map(|node| &mut node.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(key);
        self.find_node(hash, key).is_some()
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present.
    ///
    /// An existing key is overwritten in place: the node, its cached hash and
    /// the entry count are untouched, and growth is not evaluated. A new key
    /// is prepended at its chain head (no ordering guarantee among colliding
    /// keys) and then the map grows if the entry count exceeds the threshold.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let index = Self::bucket_index(hash, self.buckets.len());

        let mut cursor = self.buckets[index];
        while let Some(k) = cursor {
            let node = &mut self.nodes[k];
            if node.hash == hash && node.key == key {
                return Some(mem::replace(&mut node.value, value));
            }
            cursor = node.next;
        }

        let head = self.buckets[index];
        let k = self.nodes.insert(Node {
            key,
            value,
            hash,
            next: head,
        });
        self.buckets[index] = Some(k);
        if self.nodes.len() > self.threshold() {
            Self::grow(&mut self.buckets, &mut self.nodes);
        }
        None
    }

    /// Removes the entry for `key`, returning its value, or `None` if the
    /// key is absent. Removal never shrinks the bucket array.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(key);
        let index = Self::bucket_index(hash, self.buckets.len());

        let mut prev: Option<NodeKey> = None;
        let mut cursor = self.buckets[index];
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            if node.hash == hash && node.key.borrow() == key {
                let next = node.next;
                // Fix the predecessor link (or the bucket head) in the same
                // step that hands the node to the arena removal.
                match prev {
                    Some(p) => self.nodes[p].next = next,
                    None => self.buckets[index] = next,
                }
                return self.nodes.remove(k).map(|node| node.value);
            }
            prev = cursor;
            cursor = node.next;
        }
        None
    }

    /// Drops every entry but keeps the bucket array at its current length;
    /// capacity and threshold are unchanged. Safe no-op on an empty map.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.nodes.clear();
        for head in &mut self.buckets {
            *head = None;
        }
    }

    /// Returns the map to its just-constructed state: drops every entry,
    /// discards the grown storage and reallocates at the default capacity.
    /// Use `clear` instead to keep the current capacity for reuse.
    pub fn reset(&mut self) {
        let _g = self.reentrancy.enter();
        self.nodes = SlotMap::with_key();
        self.buckets = vec![None; DEFAULT_CAPACITY];
    }

    /// Doubles the bucket array and redistributes every chain node.
    ///
    /// The new array is allocated directly, so the live entry count is never
    /// disturbed. Nodes are relinked under their cached hash at the new
    /// capacity; nothing is rehashed or reallocated per entry.
    fn grow(buckets: &mut Vec<Option<NodeKey>>, nodes: &mut SlotMap<NodeKey, Node<K, V>>) {
        let new_capacity = buckets.len() * 2;
        let old_buckets = mem::replace(buckets, vec![None; new_capacity]);
        for head in old_buckets {
            let mut cursor = head;
            while let Some(k) = cursor {
                let node = &mut nodes[k];
                cursor = node.next;
                let index = Self::bucket_index(node.hash, new_capacity);
                node.next = buckets[index];
                buckets[index] = Some(k);
            }
        }
    }
}

#[cfg(test)]
impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Walks every chain and checks the structural invariants: power-of-two
    /// capacity, every node filed under the bucket its cached hash selects,
    /// and the reachable node count equal to the arena's live count.
    pub(crate) fn assert_invariants(&self) {
        assert!(self.buckets.len().is_power_of_two());
        assert!(self.buckets.len() >= DEFAULT_CAPACITY);
        let mut reachable = 0;
        for (index, head) in self.buckets.iter().enumerate() {
            let mut cursor = *head;
            while let Some(k) = cursor {
                let node = &self.nodes[k];
                assert_eq!(
                    Self::bucket_index(node.hash, self.buckets.len()),
                    index,
                    "node filed under the wrong bucket"
                );
                reachable += 1;
                cursor = node.next;
            }
        }
        assert_eq!(reachable, self.nodes.len(), "unreachable or duplicated nodes");
    }
}
