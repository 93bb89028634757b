//! Type aliases for commonly used cross-thread types.
//!
//! A streaming session runs on its own worker thread while the control
//! thread observes it. Connection state is the one piece of locked state
//! shared between the two.

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
///
/// # Example
/// ```rust,ignore
/// let state: ThreadSafe<ConnectionState> = thread_safe(ConnectionState::default());
/// *state.lock() = ConnectionState::Connecting;
/// ```
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Create a new `ThreadSafe<T>` from a value.
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_safe_is_shared() {
        let a = thread_safe(1u32);
        let b = a.clone();
        *b.lock() = 7;
        assert_eq!(*a.lock(), 7);
    }
}
