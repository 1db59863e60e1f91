/*!
 * Synchronization Primitives
 *
 * Shared parking infrastructure for every blocking type in the crate:
 * - `Condition`: release the state lock, sleep, reacquire, re-check
 * - `SpinWait`: bounded optimistic retries before parking
 * - `SyncConfig`: runtime selection between parking and spin-then-park
 * - `ThreadToken`: stable thread identity for reentrant ownership
 *
 * # Architecture
 *
 * Locks and queues keep their bookkeeping behind a `parking_lot::Mutex` and
 * describe "still blocked" as a predicate over that state. Nothing spins
 * while holding a state lock, and a parked thread holds no lock at all, so a
 * waiter never stalls unrelated operations on the same instance.
 */

mod condvar;
mod config;
mod spinwait;
mod thread_id;
mod wait;

pub use condvar::Condition;
pub use config::{StrategyType, SyncConfig};
pub(crate) use config::env_number;
pub use spinwait::SpinWait;
pub use thread_id::ThreadToken;
pub use wait::{deadline_after, WaitError, WaitResult, WakeResult};
