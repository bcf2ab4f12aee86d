//! Token bucket behaviour under contention.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use wallet_gateway::security::RateLimiterRegistry;

const THREADS: usize = 16;
const ATTEMPTS_PER_THREAD: usize = 25;

#[test]
fn test_concurrent_consumers_never_exceed_capacity() {
    let registry = Arc::new(RateLimiterRegistry::new());
    let admitted = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..ATTEMPTS_PER_THREAD {
                    // Refill is negligible over the test's lifetime.
                    let bucket = registry.get_or_create("203.0.113.9", 100.0, 0.001);
                    if bucket.try_consume(1.0) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(admitted.load(Ordering::SeqCst), 100);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_concurrent_creation_yields_one_bucket_per_key() {
    let registry = RateLimiterRegistry::new();

    let buckets: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| registry.get_or_create("shared", 10.0, 1.0)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(registry.len(), 1);
    assert!(buckets.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_keys_are_isolated() {
    let registry = RateLimiterRegistry::new();

    let first = registry.get_or_create("198.51.100.1", 3.0, 0.001);
    for _ in 0..3 {
        assert!(first.try_consume(1.0));
    }
    assert!(!first.try_consume(1.0));

    let second = registry.get_or_create("198.51.100.2", 3.0, 0.001);
    assert!(second.try_consume(1.0));
    assert_eq!(registry.len(), 2);
}
