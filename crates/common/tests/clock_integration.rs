//! Integration tests for the clock abstraction and lock helpers
//!
//! Exercises the pieces metric instances share across threads: a mock clock
//! advanced from one thread and observed from another, and poison recovery
//! on a lock a panicking thread held.

use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use dimetrics_common::{
    lock_or_recover, write_or_recover, Clock, MockClock, SharedClock, SystemClock,
};

/// Validates clones of a mock clock observe the same time across threads.
///
/// Assertions:
/// - Confirms a shared handle sees 90 seconds advanced on another thread.
/// - Confirms the driving clone reports the same elapsed time.
#[test]
fn test_mock_clock_shared_between_threads() {
    let clock = MockClock::new();
    let shared: SharedClock = clock.shared();
    let origin = shared.now();

    let driver = clock.clone();
    thread::spawn(move || driver.advance(Duration::from_secs(90)))
        .join()
        .expect("clock driver thread");

    assert_eq!(shared.seconds_since(origin), 90.0);
    assert_eq!(clock.elapsed(), Duration::from_secs(90));
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock::shared();
    let first = clock.now();
    let second = clock.now();

    assert!(second >= first);
    assert!(clock.seconds_since(second) >= 0.0);
}

#[test]
fn test_recovered_locks_keep_data() {
    let counter = Arc::new(Mutex::new(1_u32));
    let table = Arc::new(RwLock::new(vec!["a"]));

    let (c, t) = (Arc::clone(&counter), Arc::clone(&table));
    let _ = thread::spawn(move || {
        let _m = c.lock().expect("mutex");
        let _w = t.write().expect("rwlock");
        panic!("poison both");
    })
    .join();

    *lock_or_recover(&counter, "test::counter") += 1;
    write_or_recover(&table, "test::table").push("b");

    assert_eq!(*lock_or_recover(&counter, "test::counter"), 2);
    assert_eq!(*write_or_recover(&table, "test::table"), vec!["a", "b"]);
}
