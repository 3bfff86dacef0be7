//! Hopscotch set with shadow occupancy tracking.
//!
//! The neighborhood of a home bucket is implicit: lookups scan forward from
//! the home, consulting the per-slot presence bits of the store. The scan
//! covers the whole add range rather than just the hop range, which keeps
//! it oblivious to where the insert probe may have found free slots.
//!
//! Inserting into a full neighborhood runs the hop cascade: the nearest
//! free slot is swapped leftward, one resident at a time, until it lies
//! within the hop range of the new key's home. Every swap keeps the moved
//! resident inside its own neighborhood, so the displacement bound holds
//! for every key whenever a call returns.

use std::borrow::Borrow;
use std::fmt;
use std::fmt::Debug;
use std::hash::BuildHasher;
use std::hash::Hash;

use crate::grow::GrowthPlan;
use crate::hasher::SipHashBuilder;
use crate::slots::SlotStore;
use crate::ResizeFailed;
use crate::DEFAULT_ADD_RANGE;
use crate::DEFAULT_HOP_RANGE;
use crate::DEFAULT_MAX_RESIZE_TRIES;
use crate::INITIAL_CAPACITY;

/// A hopscotch hash set tracking occupancy with one presence bit per slot.
pub struct ShadowSet<K, S = SipHashBuilder> {
    slots: SlotStore<K>,
    hop_range: usize,
    add_range: usize,
    max_resize_tries: usize,
    hasher: S,
}

impl<K> ShadowSet<K, SipHashBuilder> {
    /// Creates an empty set with the default parameters and hasher.
    pub fn new() -> Self {
        Self::with_params(
            DEFAULT_HOP_RANGE,
            DEFAULT_ADD_RANGE,
            DEFAULT_MAX_RESIZE_TRIES,
        )
    }

    /// Creates an empty set with explicit hop range, add range, and growth
    /// retry bound.
    ///
    /// Panics if `hop_range` is zero, `add_range` does not cover
    /// `hop_range`, or `max_resize_tries` is zero.
    pub fn with_params(hop_range: usize, add_range: usize, max_resize_tries: usize) -> Self {
        Self::with_params_and_hasher(
            hop_range,
            add_range,
            max_resize_tries,
            SipHashBuilder::default(),
        )
    }
}

impl<K> Default for ShadowSet<K, SipHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> ShadowSet<K, S> {
    /// Creates an empty set with the default parameters and the given
    /// hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_params_and_hasher(
            DEFAULT_HOP_RANGE,
            DEFAULT_ADD_RANGE,
            DEFAULT_MAX_RESIZE_TRIES,
            hasher,
        )
    }

    /// Creates an empty set with explicit parameters and the given hasher.
    ///
    /// Panics under the same conditions as [`ShadowSet::with_params`].
    pub fn with_params_and_hasher(
        hop_range: usize,
        add_range: usize,
        max_resize_tries: usize,
        hasher: S,
    ) -> Self {
        assert!(hop_range > 0, "hop range must be positive");
        assert!(add_range >= hop_range, "add range must cover the hop range");
        assert!(max_resize_tries > 0, "at least one resize try is required");
        ShadowSet {
            slots: SlotStore::new(INITIAL_CAPACITY),
            hop_range,
            add_range,
            max_resize_tries,
            hasher,
        }
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.slots.num_occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current slot count. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Ratio of keys to slots.
    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.capacity() as f32
    }

    /// Visits the keys in slot order. The order is an artifact of hashing
    /// and hop history, not a contract.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.slots.occupied().map(|index| self.slots.read(index))
    }

    fn mask(&self) -> usize {
        self.slots.capacity() - 1
    }
}

impl<K, S> ShadowSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher.hash_one(key)
    }

    fn home<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        self.hash_of(key) as usize & self.mask()
    }

    fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mask = self.mask();
        let home = self.home(key);
        for step in 0..self.add_range {
            let index = (home + step) & mask;
            if self.slots.test(index) && self.slots.read(index).borrow() == key {
                return Some(index);
            }
        }
        None
    }

    /// Whether `key` is in the set.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_index(key).is_some()
    }

    /// Inserts `key`, growing the table if its neighborhood is stuck.
    ///
    /// Returns the slot index the key sits in and whether it was newly
    /// inserted; `(index, false)` means an equal key was already present.
    /// The index is invalidated by any later insert or growth.
    pub fn insert(&mut self, key: K) -> Result<(usize, bool), ResizeFailed> {
        let mut key = match self.try_insert(key) {
            Ok(result) => return Ok(result),
            Err(key) => key,
        };
        for _ in 0..self.max_resize_tries {
            self.resize()?;
            key = match self.try_insert(key) {
                Ok(result) => return Ok(result),
                Err(key) => key,
            };
        }
        Err(ResizeFailed)
    }

    /// Removes `key`, returning whether it was present. Slots are cleared
    /// in place; removal never moves other keys.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find_index(key) {
            Some(index) => {
                self.slots.clear(index);
                true
            }
            None => false,
        }
    }

    /// One insert attempt at the current capacity. Gives the key back if no
    /// free slot can be brought into the home neighborhood.
    fn try_insert(&mut self, key: K) -> Result<(usize, bool), K> {
        if let Some(index) = self.find_index(&key) {
            return Ok((index, false));
        }

        let mask = self.mask();
        let home = self.home(&key);

        let mut found = None;
        let mut right_shift = 0;
        while right_shift < self.add_range {
            let index = (home + right_shift) & mask;
            if !self.slots.test(index) {
                found = Some(index);
                break;
            }
            right_shift += 1;
        }
        let Some(mut empty) = found else {
            return Err(key);
        };

        while right_shift >= self.hop_range {
            let mut moved = false;
            for shift_to_move in (right_shift - self.hop_range + 1)..right_shift {
                let candidate = (home + shift_to_move) & mask;
                let candidate_home = self.home(self.slots.read(candidate));
                if empty.wrapping_sub(candidate_home) & mask < self.hop_range {
                    let resident = self.slots.take(candidate);
                    self.slots.write(empty, resident);
                    empty = candidate;
                    right_shift = shift_to_move;
                    moved = true;
                    break;
                }
            }
            if !moved {
                return Err(key);
            }
        }

        self.slots.write(empty, key);
        Ok((empty, true))
    }

    /// Replaces the store with one of doubled capacity, re-placing every
    /// key. Tries up to `max_resize_tries` doublings; a failed attempt
    /// leaves the set untouched.
    fn resize(&mut self) -> Result<(), ResizeFailed> {
        let mut next_capacity = self.capacity();
        for _ in 0..self.max_resize_tries {
            next_capacity *= 2;
            let mask = next_capacity - 1;

            let mut plan = GrowthPlan::new(next_capacity, self.hop_range, self.add_range);
            let mut placements = Vec::with_capacity(self.len());
            let mut complete = true;
            for index in self.slots.occupied() {
                let home = self.hash_of(self.slots.read(index)) as usize & mask;
                match plan.place(home) {
                    Some(slot) => placements.push((index, slot)),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if !complete {
                continue;
            }

            let mut grown = SlotStore::new(next_capacity);
            for (old, new) in placements {
                grown.write(new, self.slots.take(old));
            }
            self.slots = grown;
            return Ok(());
        }
        Err(ResizeFailed)
    }
}

impl<K, S> Extend<K> for ShadowSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Panics on [`ResizeFailed`]; use [`ShadowSet::insert`] to handle
    /// growth failure.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key).expect("table growth failed");
        }
    }
}

impl<K, S> FromIterator<K> for ShadowSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<K: Debug, S> Debug for ShadowSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
