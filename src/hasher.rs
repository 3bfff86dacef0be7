//! Default key hashing.
//!
//! Every set in the process shares one random SipHash key, drawn on first
//! use. The sets assume nothing about the hash beyond determinism, but a
//! keyed hash keeps untrusted key sets from piling an entire workload onto
//! one neighborhood.

use rand::thread_rng;
use rand::RngCore;
use siphasher::sip::SipHasher13;
use std::hash::BuildHasher;
use std::ptr::addr_of;
use std::ptr::addr_of_mut;
use std::sync::Once;

static mut SIP_KEY: [u8; 16] = [0; 16];
static INIT: Once = Once::new();

fn sip_key() -> [u8; 16] {
    INIT.call_once(|| {
        let mut rng = thread_rng();
        unsafe {
            rng.fill_bytes(&mut (&mut *addr_of_mut!(SIP_KEY))[..]);
        }
    });
    unsafe { *addr_of!(SIP_KEY) }
}

/// Builds [`SipHasher13`] hashers over the process-wide random key.
///
/// Two builders obtained through [`Default`] in the same process hash
/// identically, so homes computed by one set agree with another's.
#[derive(Clone, Copy, Debug)]
pub struct SipHashBuilder {
    key: [u8; 16],
}

impl Default for SipHashBuilder {
    fn default() -> Self {
        SipHashBuilder { key: sip_key() }
    }
}

impl BuildHasher for SipHashBuilder {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> SipHasher13 {
        SipHasher13::new_with_key(&self.key)
    }
}
