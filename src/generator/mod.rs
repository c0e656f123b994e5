//! Generator Contract
//!
//! Every lazy sequence in this crate implements [`Generator`]:
//! - `next()` pulls the next element, or reports exhaustion
//! - `stop()` requests early termination and releases resources
//!
//! A pull returns an [`IteratorResult`] `{ value, done }`. Once `done` is
//! `true` the value is `Item::default()` and every later pull answers the same.
//!
//! Generators are single-consumer: `next()` takes `&mut self`, so the pull
//! cursor belongs to whoever holds the handle. Sharing one generator between
//! threads requires external locking and is not supported by the engine.

use std::fmt;

use crate::error::Result;

/// Lifecycle state of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorState {
    /// Created, producer not spawned yet.
    NotStarted,
    /// Producer task is live.
    Running,
    /// Terminal: exhausted, failed or stopped.
    Stopped,
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorState::NotStarted => write!(f, "not started"),
            GeneratorState::Running => write!(f, "running"),
            GeneratorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Outcome of a single pull: `{ value, done }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IteratorResult<T> {
    /// The produced element, or `T::default()` when `done`.
    pub value: T,
    /// `true` once the generator is exhausted.
    pub done: bool,
}

impl<T> IteratorResult<T> {
    /// A produced element.
    pub fn yielded(value: T) -> Self {
        Self { value, done: false }
    }

    /// Convert into `Some(value)` while not done.
    pub fn into_option(self) -> Option<T> {
        if self.done {
            None
        } else {
            Some(self.value)
        }
    }

    /// Split into the `(value, done)` pair.
    pub fn into_pair(self) -> (T, bool) {
        (self.value, self.done)
    }
}

impl<T: Default> IteratorResult<T> {
    /// The exhaustion marker: default value with `done = true`.
    pub fn exhausted() -> Self {
        Self {
            value: T::default(),
            done: true,
        }
    }
}

/// The capability set every generator variant implements.
pub trait Generator {
    /// Element type. `Default` supplies the value reported on exhaustion.
    type Item: Default;

    /// Pull the next element.
    ///
    /// Blocks until the producer has an element ready or has terminated.
    /// A producer failure is reported once as `Err`; exhaustion is `Ok` with
    /// `done = true`.
    fn next(&mut self) -> Result<IteratorResult<Self::Item>>;

    /// Request termination and wait for the finalizer. Idempotent.
    fn stop(&mut self);
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    type Item = G::Item;

    fn next(&mut self) -> Result<IteratorResult<Self::Item>> {
        (**self).next()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// The producer side of a generator, run on its own thread by the engine.
///
/// `step` is called until it returns `Ok(None)` or an error; `finish` is
/// called exactly once afterwards, whether the producer ended by exhaustion,
/// failure or cancellation.
pub trait Producer: Send + 'static {
    type Item: Send + 'static;

    /// Compute the next element, `Ok(None)` when there are no more.
    fn step(&mut self) -> Result<Option<Self::Item>>;

    /// Release whatever the producer holds.
    fn finish(&mut self) {}
}

/// A [`Producer`] built from a step closure and a finalizer closure.
pub struct FnProducer<S, F> {
    step: S,
    finalizer: Option<F>,
}

impl<S, F> FnProducer<S, F> {
    pub fn new(step: S, finalizer: F) -> Self {
        Self {
            step,
            finalizer: Some(finalizer),
        }
    }
}

impl<T, S, F> Producer for FnProducer<S, F>
where
    T: Send + 'static,
    S: FnMut() -> Result<Option<T>> + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    type Item = T;

    fn step(&mut self) -> Result<Option<T>> {
        (self.step)()
    }

    fn finish(&mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            finalizer();
        }
    }
}

/// Blocking [`Iterator`] over a generator.
///
/// Yields `Ok(value)` for each element, then ends. If the generator fails,
/// the error is yielded once and iteration ends.
pub struct Iter<'a, G: ?Sized> {
    generator: &'a mut G,
    finished: bool,
}

impl<'a, G: Generator + ?Sized> Iterator for Iter<'a, G> {
    type Item = Result<G::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.generator.next() {
            Ok(result) if result.done => {
                self.finished = true;
                None
            }
            Ok(result) => Some(Ok(result.value)),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Convenience methods available on every generator.
pub trait GeneratorExt: Generator {
    /// Transform each element with `f`. See [`crate::combinators::map`].
    fn map<L, F>(self, f: F) -> Result<crate::engine::BaseGenerator<L>>
    where
        Self: Sized + Send + 'static,
        Self::Item: Send + 'static,
        L: Default + Send + 'static,
        F: FnMut(Self::Item) -> L + Send + 'static,
    {
        crate::combinators::map(self, f)
    }

    /// Expand each element into a sub-generator and chain them.
    /// See [`crate::combinators::flatten`].
    fn flat_map<I, F>(self, expand: F) -> Result<crate::engine::BaseGenerator<I::Item>>
    where
        Self: Sized + Send + 'static,
        Self::Item: Send + 'static,
        I: Generator + Send + 'static,
        I::Item: Send + 'static,
        F: FnMut(Self::Item) -> Result<I> + Send + 'static,
    {
        crate::combinators::flatten(self, expand)
    }

    /// Pull every remaining element into a `Vec`.
    fn drain(&mut self) -> Result<Vec<Self::Item>> {
        crate::combinators::drain(self)
    }

    /// Borrow as a blocking iterator of `Result<Item>`.
    fn iter(&mut self) -> Iter<'_, Self> {
        Iter {
            generator: self,
            finished: false,
        }
    }
}

impl<G: Generator + ?Sized> GeneratorExt for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Countdown that lives entirely on the caller's thread.
    struct Inline {
        remaining: u32,
        stopped: bool,
        fail_at: Option<u32>,
    }

    impl Generator for Inline {
        type Item = u32;

        fn next(&mut self) -> Result<IteratorResult<u32>> {
            if self.stopped || self.remaining == 0 {
                return Ok(IteratorResult::exhausted());
            }
            if self.fail_at == Some(self.remaining) {
                self.stopped = true;
                return Err(Error::step_failed("inline failure"));
            }
            self.remaining -= 1;
            Ok(IteratorResult::yielded(self.remaining + 1))
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    #[test]
    fn test_iterator_result_helpers() {
        let r = IteratorResult::yielded(7);
        assert_eq!(r.into_pair(), (7, false));
        assert_eq!(r.into_option(), Some(7));

        let done: IteratorResult<String> = IteratorResult::exhausted();
        assert!(done.done);
        assert_eq!(done.value, "");
        assert_eq!(done.into_option(), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(GeneratorState::NotStarted.to_string(), "not started");
        assert_eq!(GeneratorState::Running.to_string(), "running");
        assert_eq!(GeneratorState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_iter_yields_until_done() {
        let mut g = Inline { remaining: 3, stopped: false, fail_at: None };
        let values: Vec<u32> = g.iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn test_iter_surfaces_error_once() {
        let mut g = Inline { remaining: 4, stopped: false, fail_at: Some(2) };
        let items: Vec<Result<u32>> = g.iter().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(*items[0].as_ref().unwrap(), 4);
        assert_eq!(*items[1].as_ref().unwrap(), 3);
        assert!(items[2].as_ref().unwrap_err().is_step_failure());
    }

    #[test]
    fn test_boxed_generator_forwards() {
        let mut boxed: Box<dyn Generator<Item = u32>> =
            Box::new(Inline { remaining: 2, stopped: false, fail_at: None });
        assert_eq!(boxed.next().unwrap().value, 2);
        boxed.stop();
        assert!(boxed.next().unwrap().done);
    }

    #[test]
    fn test_fn_producer_finalizes_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut producer = FnProducer::new(
            || -> Result<Option<u8>> { Ok(Some(1)) },
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert_eq!(producer.step().unwrap(), Some(1));
        producer.finish();
        producer.finish();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
