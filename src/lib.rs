#![doc = include_str!("../README.md")]

pub mod bitmap;
mod grow;
pub mod hasher;
mod hopmap;
pub mod shadow;
mod slots;

pub use bitmap::BitmapSet;
pub use hasher::SipHashBuilder;
pub use shadow::ShadowSet;

/// Slot count of a freshly constructed set.
pub const INITIAL_CAPACITY: usize = 64;

/// Default maximum displacement between a key's home bucket and the slot
/// actually holding it.
pub const DEFAULT_HOP_RANGE: usize = 32;

/// Default distance the insert probe covers while looking for a free slot.
pub const DEFAULT_ADD_RANGE: usize = 128;

/// Default number of growth rounds attempted before an insert gives up.
pub const DEFAULT_MAX_RESIZE_TRIES: usize = 2;

/// Returned by `insert` when repeated capacity doublings still could not
/// place the new key within its home neighborhood.
///
/// No key was inserted and no key was lost. Growth rounds that succeeded
/// before the final failure are kept, so the capacity may have increased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeFailed;

impl std::fmt::Display for ResizeFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table growth failed to restore the hop invariant")
    }
}

impl std::error::Error for ResizeFailed {}
