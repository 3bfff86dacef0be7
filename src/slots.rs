//! Presence-tracked slot storage backing both set variants.
//!
//! Occupancy lives in a bitmap separate from the key cells, so keys never
//! need a sentinel value and empty cells are never observed as keys. The
//! hop cascade and the growth drain move keys with [`SlotStore::take`],
//! which is why no operation here requires `Clone`.

use std::mem::needs_drop;
use std::mem::MaybeUninit;

pub(crate) struct SlotStore<K> {
    present: Box<[u64]>,
    cells: Box<[MaybeUninit<K>]>,
    occupied: usize,
}

impl<K> SlotStore<K> {
    /// Creates an all-empty store. `capacity` must be a power of two of at
    /// least 64, so the presence bitmap is always a whole number of words.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity >= 64);
        SlotStore {
            present: vec![0; capacity / 64].into_boxed_slice(),
            cells: Box::new_uninit_slice(capacity),
            occupied: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn num_occupied(&self) -> usize {
        self.occupied
    }

    pub fn test(&self, index: usize) -> bool {
        self.present[index >> 6] & (1 << (index & 63)) != 0
    }

    /// The slot must be occupied.
    pub fn read(&self, index: usize) -> &K {
        debug_assert!(self.test(index));
        unsafe { self.cells[index].assume_init_ref() }
    }

    /// Stores `key` and marks the slot present. The slot must be empty.
    pub fn write(&mut self, index: usize, key: K) {
        debug_assert!(!self.test(index));
        self.cells[index].write(key);
        self.present[index >> 6] |= 1 << (index & 63);
        self.occupied += 1;
    }

    /// Moves the key out, leaving the slot empty. The slot must be occupied.
    pub fn take(&mut self, index: usize) -> K {
        debug_assert!(self.test(index));
        self.present[index >> 6] &= !(1 << (index & 63));
        self.occupied -= 1;
        unsafe { self.cells[index].assume_init_read() }
    }

    /// Drops the key in place and marks the slot empty.
    pub fn clear(&mut self, index: usize) {
        drop(self.take(index));
    }

    /// Indices of occupied slots, ascending.
    pub fn occupied(&self) -> OccupiedIter<'_> {
        let (word, rest) = match self.present.split_first() {
            Some((&word, rest)) => (word, rest),
            None => (0, &[][..]),
        };
        OccupiedIter {
            rest,
            word,
            base: 0,
        }
    }
}

impl<K> Drop for SlotStore<K> {
    fn drop(&mut self) {
        if !needs_drop::<K>() {
            return;
        }
        for (word_index, &word) in self.present.iter().enumerate() {
            let mut word = word;
            while word != 0 {
                let index = (word_index << 6) + word.trailing_zeros() as usize;
                word &= word - 1;
                unsafe { self.cells[index].assume_init_drop() };
            }
        }
    }
}

pub(crate) struct OccupiedIter<'a> {
    rest: &'a [u64],
    word: u64,
    base: usize,
}

impl Iterator for OccupiedIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.word == 0 {
            let (&word, rest) = self.rest.split_first()?;
            self.word = word;
            self.rest = rest;
            self.base += 64;
        }
        let bit = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}
