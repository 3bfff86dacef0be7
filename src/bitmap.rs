//! Hopscotch set with per-bucket neighborhood bitmaps.
//!
//! Next to the slot array this variant keeps one hop word per home bucket,
//! flagging which of the following hop-range slots hold keys homed there.
//! Lookups iterate only the flagged slots instead of scanning the add
//! range, at the cost of maintaining the words through every hop, erase,
//! and growth. Hop words are 32 bits wide, so the hop range is capped at
//! 32 here.

use std::borrow::Borrow;
use std::fmt;
use std::fmt::Debug;
use std::hash::BuildHasher;
use std::hash::Hash;

use crate::grow::GrowthPlan;
use crate::hasher::SipHashBuilder;
use crate::hopmap::HopMap;
use crate::slots::SlotStore;
use crate::ResizeFailed;
use crate::DEFAULT_ADD_RANGE;
use crate::DEFAULT_HOP_RANGE;
use crate::DEFAULT_MAX_RESIZE_TRIES;
use crate::INITIAL_CAPACITY;

/// A hopscotch hash set that resolves membership through per-bucket
/// occupancy bitmaps.
pub struct BitmapSet<K, S = SipHashBuilder> {
    slots: SlotStore<K>,
    hop: HopMap,
    hop_range: usize,
    add_range: usize,
    max_resize_tries: usize,
    hasher: S,
}

impl<K> BitmapSet<K, SipHashBuilder> {
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
    /// Panics if `hop_range` is zero or above 32, `add_range` does not
    /// cover `hop_range`, or `max_resize_tries` is zero.
    pub fn with_params(hop_range: usize, add_range: usize, max_resize_tries: usize) -> Self {
        Self::with_params_and_hasher(
            hop_range,
            add_range,
            max_resize_tries,
            SipHashBuilder::default(),
        )
    }
}

impl<K> Default for BitmapSet<K, SipHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> BitmapSet<K, S> {
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
    /// Panics under the same conditions as [`BitmapSet::with_params`].
    pub fn with_params_and_hasher(
        hop_range: usize,
        add_range: usize,
        max_resize_tries: usize,
        hasher: S,
    ) -> Self {
        assert!(hop_range > 0, "hop range must be positive");
        assert!(hop_range <= 32, "hop words are 32 bits wide");
        assert!(add_range >= hop_range, "add range must cover the hop range");
        assert!(max_resize_tries > 0, "at least one resize try is required");
        BitmapSet {
            slots: SlotStore::new(INITIAL_CAPACITY),
            hop: HopMap::new(INITIAL_CAPACITY),
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

    /// Visits the keys in slot order; the order is not a contract.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.slots.occupied().map(|index| self.slots.read(index))
    }

    fn mask(&self) -> usize {
        self.slots.capacity() - 1
    }
}

impl<K, S> BitmapSet<K, S>
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
        for offset in self.hop.offsets(home) {
            let index = (home + offset) & mask;
            if self.slots.read(index).borrow() == key {
                return Some(index);
            }
        }
        None
    }

    /// Whether `key` is in the set. Only slots flagged in the home's hop
    /// word are compared.
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
    /// inserted. The index is invalidated by any later insert or growth.
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

    /// Removes `key`, returning whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find_index(key) {
            Some(index) => {
                let home = self.home(key);
                self.hop.unset(home, index.wrapping_sub(home) & self.mask());
                self.slots.clear(index);
                true
            }
            None => false,
        }
    }

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
                    self.hop
                        .unset(candidate_home, candidate.wrapping_sub(candidate_home) & mask);
                    self.hop
                        .set(candidate_home, empty.wrapping_sub(candidate_home) & mask);
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

        self.hop.set(home, empty.wrapping_sub(home) & mask);
        self.slots.write(empty, key);
        Ok((empty, true))
    }

    /// Doubles capacity and re-places every key, rebuilding the hop words
    /// from the plan. A failed attempt leaves the set untouched.
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
                    Some(slot) => placements.push((index, home, slot)),
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
            let mut hop = HopMap::new(next_capacity);
            for (old, home, new) in placements {
                grown.write(new, self.slots.take(old));
                hop.set(home, new.wrapping_sub(home) & mask);
            }
            self.slots = grown;
            self.hop = hop;
            return Ok(());
        }
        Err(ResizeFailed)
    }
}

impl<K, S> Extend<K> for BitmapSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Panics on [`ResizeFailed`]; use [`BitmapSet::insert`] to handle
    /// growth failure.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key).expect("table growth failed");
        }
    }
}

impl<K, S> FromIterator<K> for BitmapSet<K, S>
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

impl<K: Debug, S> Debug for BitmapSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
