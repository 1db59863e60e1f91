/*!
 * Thread Identity
 *
 * Stable, process-unique identifiers for OS threads, used for reentrant
 * ownership. `std::thread::ThreadId` has no stable integer form, so each
 * thread draws a token from a global counter on first use.
 */

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Zero is reserved for "no owner"
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: Cell<u64> = const { Cell::new(0) };
}

/// Identity of one OS thread for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadToken(u64);

impl ThreadToken {
    /// Token of the calling thread
    #[inline]
    pub fn current() -> Self {
        CURRENT.with(|cell| {
            let mut token = cell.get();
            if token == 0 {
                token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
                cell.set(token);
            }
            ThreadToken(token)
        })
    }

    /// Raw non-zero value
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}
