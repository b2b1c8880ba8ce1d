mod hash;
mod stats;

pub use hash::EncodingError;

use std::mem;

use serde::Serialize;

use stats::PslStats;

// Capacity used when none is requested.
const DEFAULT_CAPACITY: usize = 8;

// Occupancy bound that triggers a grow before a new key is placed. Robin
// Hood displacement keeps probe chains flat enough to run this close to
// full.
const LOAD_FACTOR: f64 = 0.9;

// An occupied slot.
//
// `digest` is the keyed hash of the encoded key, computed once when the key
// first enters the table. Growing rehomes entries from it without touching
// the encoder, and probes compare it before falling back to key equality.
struct Slot<K, V> {
    key: K,
    value: V,
    digest: u64,
    // Distance from the slot the digest maps to, wrapping at capacity.
    psl: usize,
}

// A Robin Hood hash table with backward-shift deletion.
//
// Exclusively owned storage: no reference to a slot outlives the operation
// that touched it, and every mutation of the probe statistics goes through
// insert, remove, or grow.
pub struct RawTable<K, V> {
    slots: Box<[Option<Slot<K, V>>]>,
    len: usize,
    // SipHash key pair, drawn at construction and fixed for the table's
    // lifetime.
    k0: u64,
    k1: u64,
    stats: PslStats,
}

fn alloc_slots<K, V>(capacity: usize) -> Box<[Option<Slot<K, V>>]> {
    (0..capacity).map(|_| None).collect()
}

impl<K, V> RawTable<K, V> {
    pub fn new() -> RawTable<K, V> {
        RawTable::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> RawTable<K, V> {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        RawTable::with_seeds(capacity, rand::random(), rand::random())
    }

    // Deterministic seeds, so tests can stage specific clusters.
    fn with_seeds(capacity: usize, k0: u64, k1: u64) -> RawTable<K, V> {
        RawTable {
            slots: alloc_slots(capacity),
            len: 0,
            k0,
            k1,
            stats: PslStats::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    // The slot `digest` maps to with zero displacement.
    #[inline]
    fn home(&self, digest: u64) -> usize {
        (digest % self.slots.len() as u64) as usize
    }
}

impl<K, V> RawTable<K, V>
where
    K: Eq + Serialize,
{
    fn digest_of(&self, key: &K) -> Result<u64, EncodingError> {
        let bytes = hash::encode(key)?;
        Ok(hash::digest(self.k0, self.k1, &bytes))
    }

    pub fn get(&self, key: &K) -> Result<Option<&V>, EncodingError> {
        let digest = self.digest_of(key)?;
        Ok(self
            .find(key, digest)
            .map(|i| &self.slots[i].as_ref().unwrap().value))
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, EncodingError> {
        let digest = self.digest_of(&key)?;

        // An existing key is overwritten in place; the count and the probe
        // statistics are unaffected.
        if let Some(i) = self.find(&key, digest) {
            let slot = self.slots[i].as_mut().unwrap();
            return Ok(Some(mem::replace(&mut slot.value, value)));
        }

        // Grow before the load bound is crossed, so the placement loop below
        // is guaranteed an empty slot to terminate on.
        if self.len as f64 / self.slots.len() as f64 >= LOAD_FACTOR {
            self.grow();
        }

        self.place(key, value, digest);
        self.len += 1;
        Ok(None)
    }

    pub fn remove(&mut self, key: &K) -> Result<Option<V>, EncodingError> {
        if self.len == 0 {
            return Ok(None);
        }

        let digest = self.digest_of(key)?;
        match self.find(key, digest) {
            Some(i) => Ok(Some(self.remove_at(i))),
            None => Ok(None),
        }
    }

    // Locate the slot holding `key`, guided by the probe statistics.
    //
    // Probing starts at the average PSL and widens in both directions, two
    // candidate slots per step: one walking down toward 0 and one walking up
    // toward the maximum. When one bound runs out the other keeps going, so
    // the whole [0, max] range is examined before giving up. Stopping as
    // soon as either bound is exhausted would skip entries on the far side
    // whenever the distribution is skewed.
    fn find(&self, key: &K, digest: u64) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let capacity = self.slots.len();
        let home = self.home(digest);
        let max = self.stats.max_psl();

        let mut down = Some(self.stats.average());
        let mut up = self.stats.average() + 1;

        while down.is_some() || up <= max {
            if let Some(psl) = down {
                let i = (home + psl) % capacity;
                if self.matches(i, key, digest) {
                    return Some(i);
                }
                down = psl.checked_sub(1);
            }

            if up <= max {
                let i = (home + up) % capacity;
                if self.matches(i, key, digest) {
                    return Some(i);
                }
                up += 1;
            }
        }

        None
    }

    #[inline]
    fn matches(&self, i: usize, key: &K, digest: u64) -> bool {
        match &self.slots[i] {
            Some(slot) => slot.digest == digest && slot.key == *key,
            None => false,
        }
    }

    // Robin Hood placement of a key not currently in the table.
    //
    // The incoming entry probes forward from its home slot. A resident with
    // a smaller PSL has been displaced less than the traveler, so it yields
    // its slot and travels instead.
    fn place(&mut self, key: K, value: V, digest: u64) {
        let capacity = self.slots.len();
        let mut incoming = Slot {
            key,
            value,
            digest,
            psl: 0,
        };
        let mut i = self.home(digest);

        loop {
            match &mut self.slots[i] {
                None => {
                    self.stats.record(incoming.psl);
                    self.slots[i] = Some(incoming);
                    return;
                }
                Some(resident) => {
                    if resident.psl < incoming.psl {
                        self.stats.record(incoming.psl);
                        self.stats.remove(resident.psl);
                        mem::swap(resident, &mut incoming);
                    }
                    incoming.psl += 1;
                    i = (i + 1) % capacity;
                }
            }
        }
    }

    // Clear slot `i` and backward-shift the tail of its cluster.
    //
    // Every following entry with a nonzero PSL moves one slot closer to
    // home, so the cluster stays contiguous without tombstones. The shift
    // stops at an empty slot or at an entry already sitting at home.
    fn remove_at(&mut self, i: usize) -> V {
        let capacity = self.slots.len();
        let removed = self.slots[i].take().unwrap();
        self.stats.remove(removed.psl);
        self.len -= 1;

        let mut hole = i;
        loop {
            let next = (hole + 1) % capacity;
            match &self.slots[next] {
                Some(slot) if slot.psl > 0 => {
                    let mut slot = self.slots[next].take().unwrap();
                    self.stats.remove(slot.psl);
                    slot.psl -= 1;
                    self.stats.record(slot.psl);
                    self.slots[hole] = Some(slot);
                    hole = next;
                }
                _ => break,
            }
        }

        removed.value
    }

    // Double the capacity and replay every entry into the new array, in old
    // array order. Replay order changes the PSL distribution but never the
    // key set.
    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        let old = mem::replace(&mut self.slots, alloc_slots(capacity));
        self.stats.clear();

        for slot in old.into_vec().into_iter().flatten() {
            self.place(slot.key, slot.value, slot.digest);
        }
    }
}

pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Option<Slot<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some(slot) = slot {
                return Some((&slot.key, &slot.value));
            }
        }

        None
    }
}
