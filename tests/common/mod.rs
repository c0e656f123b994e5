//! Shared test helpers for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lazyseq::prelude::*;

/// Counts finalizer invocations.
#[derive(Clone, Default)]
pub struct FinalizeCounter(Arc<AtomicUsize>);

impl FinalizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn finalizer(&self) -> impl FnOnce() + Send + 'static {
        let counter = Arc::clone(&self.0);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Generator yielding `from, from - 1, ..., 1`.
pub fn countdown(from: i32, finalized: &FinalizeCounter) -> BaseGenerator<i32> {
    let mut counter = from;
    BaseGenerator::spawn(
        move || {
            if counter > 0 {
                counter -= 1;
                Ok(Some(counter + 1))
            } else {
                Ok(None)
            }
        },
        finalized.finalizer(),
    )
    .expect("spawn countdown")
}

/// Generator that never ends on its own.
#[allow(dead_code)]
pub fn naturals(finalized: &FinalizeCounter) -> BaseGenerator<u64> {
    let mut n = 0;
    BaseGenerator::spawn(
        move || {
            n += 1;
            Ok(Some(n))
        },
        finalized.finalizer(),
    )
    .expect("spawn naturals")
}
