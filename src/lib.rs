//! chained-hashmap: a single-threaded hash map built from first principles
//! over a power-of-two bucket array with separate chaining.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the whole table structure (bucket array, chains, growth
//!   policy) in the crate's own hands instead of delegating to a ready-made
//!   hash table. Only the hash function comes from the ecosystem.
//! - Layout:
//!   - `buckets: Vec<Option<NodeKey>>`: chain heads; the length is the
//!     capacity, always a power of two (minimum 16), so bucket selection is
//!     `hash & (capacity - 1)`.
//!   - `nodes: SlotMap<NodeKey, Node>`: arena owning every chain node; chain
//!     links are arena keys, so each node has exactly one owner (its
//!     predecessor's link or a bucket head) and unlinking hands the node to
//!     the arena removal in the same step.
//!   - Each node caches its full `u64` hash at insertion; chain scans
//!     short-circuit on the cached hash before touching `K: Eq`, and growth
//!     redistributes nodes without ever re-invoking `K: Hash`.
//!
//! Growth policy
//! - Fixed load factor 0.75 over a fixed default capacity of 16; neither is
//!   a runtime parameter. After a new key lands, the table doubles when the
//!   entry count exceeds `floor(capacity * 0.75)` (12, 24, 48, …).
//! - Growth allocates the new bucket array directly and relinks the existing
//!   nodes under their cached hashes: a migration, not a rebuild. The entry
//!   count lives in the arena, so nothing ever saves and restores it.
//! - Capacity only grows. `clear` keeps it; `reset` releases everything and
//!   returns to the default capacity.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` via the embedded debug reentrancy
//!   flag; concurrent use is out of scope rather than synchronized.
//! - Reentrancy: the map runs user code only through `K: Eq`/`K: Hash`
//!   during probes. In debug builds, re-entering the map from that code
//!   panics; in release builds the check compiles away.
//! - `ChainedHashMap` does not implement `Clone`: a map is the sole owner of
//!   its nodes and bucket array, and `Drop` releases both deterministically.
//! - Absence is signaled with `Option`/`bool`, never a panic; allocation
//!   failure aborts per std semantics. There is no other failure mode.
//!
//! Non-goals
//! - No iteration or enumeration API.
//! - No pluggable hash functions on the public surface; the hasher type
//!   parameter is a crate-internal seam for deterministic tests.
//! - No shrinking on removal and no open addressing.

mod chained_hash_map;
mod chained_hash_map_proptest;
mod reentrancy;

// Public surface
pub use chained_hash_map::ChainedHashMap;
