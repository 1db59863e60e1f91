/*!
 * Locks
 *
 * Blocking mutual exclusion with scoped guards:
 * - `Mutex`: exclusive, non-reentrant, no owner tracking
 * - `ReentrantMutex`: exclusive, recursive for the owning thread
 * - `ReadWriteLock`: shared readers or one writer, writer preference
 *
 * Every lock supports blocking, try and timed acquisition. Timed acquisition
 * returns `None` on timeout and leaves the lock untouched.
 */

mod mutex;
mod raw;
mod reentrant;
mod rwlock;

pub use mutex::{Mutex, MutexGuard};
pub use raw::RawMutex;
pub use reentrant::{ReentrantMutex, ReentrantMutexGuard};
pub use rwlock::{ReadGuard, ReadWriteLock, WriteGuard};
