//! Core Engine
//!
//! [`BaseGenerator`] runs a [`Producer`] on a dedicated thread and hands its
//! elements to the consumer one at a time through a rendezvous slot guarded by
//! a mutex and condition variable.
//!
//! # Protocol
//!
//! - The producer calls `step()`, places the element in the slot and blocks
//!   until the consumer takes it or cancellation is requested. Cancellation
//!   discards an untaken element.
//! - The consumer blocks in `next()` until the slot holds an element or the
//!   producer has marked itself finished.
//! - After the producer loop ends for any reason, `finish()` runs exactly once
//!   on the producer thread, then the finished flag is raised.
//! - `stop()` raises the cancellation flag and waits for the finished flag.
//!   Cancellation is observed only at the handoff, never mid-step.
//!
//! At most one element is in flight: the producer computes element `n + 1`
//! only after element `n` has been taken.
//!
//! # Example
//!
//! ```
//! use lazyseq::prelude::*;
//!
//! let mut counter = 3;
//! let mut g = BaseGenerator::spawn(
//!     move || {
//!         if counter == 0 {
//!             return Ok(None);
//!         }
//!         counter -= 1;
//!         Ok(Some(counter + 1))
//!     },
//!     || {},
//! )?;
//! assert_eq!(g.drain()?, vec![3, 2, 1]);
//! assert!(g.next()?.done);
//! # Ok::<(), lazyseq::Error>(())
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, trace, warn};

use crate::config::GeneratorConfig;
use crate::error::{messages, Error, Result};
use crate::generator::{FnProducer, Generator, GeneratorState, IteratorResult, Producer};

// ---------------------------------------------------------------------------
// Handoff
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Handoff<T> {
    /// Element offered by the producer and not yet taken.
    offered: Option<T>,
    /// Set once by `stop()`; never cleared.
    cancelled: bool,
    /// Set once by the producer after its finalizer ran.
    finished: bool,
    /// Failure that ended the producer, until a pull reports it.
    failure: Option<Error>,
}

/// What a blocked pull resolved to.
enum Taken<T> {
    Element(T),
    Finished(Option<Error>),
}

#[derive(Debug)]
struct Shared<T> {
    handoff: Mutex<Handoff<T>>,
    changed: Condvar,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Self {
            handoff: Mutex::new(Handoff {
                offered: None,
                cancelled: false,
                finished: false,
                failure: None,
            }),
            changed: Condvar::new(),
        }
    }

    /// Producer side: block until `value` is taken. Returns `false` if
    /// cancellation was observed instead.
    fn offer(&self, value: T) -> bool {
        let mut handoff = self.handoff.lock();
        if handoff.cancelled {
            drop(handoff);
            return false;
        }

        handoff.offered = Some(value);
        self.changed.notify_all();
        while handoff.offered.is_some() && !handoff.cancelled {
            self.changed.wait(&mut handoff);
        }

        if handoff.cancelled {
            let discarded = handoff.offered.take();
            drop(handoff);
            drop(discarded);
            return false;
        }
        true
    }

    /// Producer side: publish termination. Must be the producer's last act.
    fn finish(&self, failure: Option<Error>) {
        let mut handoff = self.handoff.lock();
        handoff.finished = true;
        handoff.failure = failure;
        self.changed.notify_all();
    }

    /// Consumer side: block until an element or termination is available.
    fn take(&self) -> Taken<T> {
        let mut handoff = self.handoff.lock();
        loop {
            if let Some(value) = handoff.offered.take() {
                self.changed.notify_all();
                return Taken::Element(value);
            }
            if handoff.finished {
                return Taken::Finished(handoff.failure.take());
            }
            self.changed.wait(&mut handoff);
        }
    }

    /// Request cancellation and wait until the finalizer has run.
    fn cancel(&self) {
        let mut handoff = self.handoff.lock();
        handoff.cancelled = true;
        self.changed.notify_all();
        while !handoff.finished {
            self.changed.wait(&mut handoff);
        }
    }

    fn take_failure(&self) -> Option<Error> {
        self.handoff.lock().failure.take()
    }

    fn is_finished(&self) -> bool {
        self.handoff.lock().finished
    }

    /// `true` once a cancellation request has been fully honoured.
    fn is_cancelled(&self) -> bool {
        let handoff = self.handoff.lock();
        handoff.cancelled && handoff.finished
    }
}

/// Type-erased cancellation used by [`StopHandle`].
trait Cancel: Send + Sync {
    fn cancel(&self);
    fn is_finished(&self) -> bool;
}

impl<T: Send> Cancel for Shared<T> {
    fn cancel(&self) {
        Shared::cancel(self)
    }

    fn is_finished(&self) -> bool {
        Shared::is_finished(self)
    }
}

// ---------------------------------------------------------------------------
// StopHandle
// ---------------------------------------------------------------------------

/// Cancels a running generator from another thread.
///
/// A pull blocked in [`Generator::next`] on the owning thread resolves to
/// exhaustion once the producer has observed the request. Stopping through a
/// handle is idempotent and never hangs after the producer has finished.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<dyn Cancel>,
}

impl StopHandle {
    /// Request cancellation and wait for the finalizer to run.
    pub fn stop(&self) {
        self.shared.cancel();
    }

    /// Returns `true` once the producer has terminated.
    pub fn is_stopped(&self) -> bool {
        self.shared.is_finished()
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BaseGenerator
// ---------------------------------------------------------------------------

/// Generator backed by a producer thread.
///
/// Created in [`GeneratorState::NotStarted`]; [`start`](Self::start) spawns
/// the producer. Dropping a running generator stops it.
pub struct BaseGenerator<T> {
    state: GeneratorState,
    config: GeneratorConfig,
    shared: Option<Arc<Shared<T>>>,
    worker: Option<JoinHandle<()>>,
}

impl<T> BaseGenerator<T> {
    /// A generator that has not been started.
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// A generator that will spawn its producer with `config`.
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            state: GeneratorState::NotStarted,
            config,
            shared: None,
            worker: None,
        }
    }

    /// Current lifecycle state.
    ///
    /// A generator stopped through a [`StopHandle`] reports
    /// [`GeneratorState::Stopped`] as soon as its finalizer has run, before
    /// the owner pulls again. A producer that ended on its own stays
    /// `Running` until a pull observes the end.
    pub fn state(&self) -> GeneratorState {
        match (&self.state, &self.shared) {
            (GeneratorState::Running, Some(shared)) if shared.is_cancelled() => {
                GeneratorState::Stopped
            }
            _ => self.state,
        }
    }

    /// Configuration the producer thread is (or will be) spawned with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn shutdown(&mut self) {
        match self.state {
            GeneratorState::Stopped => {}
            GeneratorState::NotStarted => {
                self.state = GeneratorState::Stopped;
            }
            GeneratorState::Running => {
                if let Some(shared) = &self.shared {
                    shared.cancel();
                    if let Some(e) = shared.take_failure() {
                        debug!(error = %e, "discarding producer failure on stop");
                    }
                }
                self.settle();
            }
        }
    }

    /// Reap the finished producer thread and enter the terminal state.
    fn settle(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(thread = %self.config.thread_name, "producer thread panicked outside its step");
            }
        }
        self.shared = None;
        self.state = GeneratorState::Stopped;
        debug!(thread = %self.config.thread_name, "generator stopped");
    }
}

impl<T: Send + 'static> BaseGenerator<T> {
    /// Create and start a generator from a step function and finalizer.
    pub fn spawn<S, F>(step: S, finalizer: F) -> Result<Self>
    where
        S: FnMut() -> Result<Option<T>> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let mut generator = Self::new();
        generator.start(step, finalizer)?;
        Ok(generator)
    }

    /// Create and start a generator driving `producer`.
    pub fn from_producer<P>(producer: P, config: GeneratorConfig) -> Result<Self>
    where
        P: Producer<Item = T>,
    {
        let mut generator = Self::with_config(config);
        generator.start_producer(producer)?;
        Ok(generator)
    }

    /// Start the generator.
    ///
    /// `step` is called repeatedly on the producer thread; `Ok(None)` ends the
    /// sequence. `finalizer` runs once when the producer terminates.
    ///
    /// Fails with [`Error::InvalidState`] unless the generator is
    /// [`GeneratorState::NotStarted`].
    pub fn start<S, F>(&mut self, step: S, finalizer: F) -> Result<()>
    where
        S: FnMut() -> Result<Option<T>> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        self.start_producer(FnProducer::new(step, finalizer))
    }

    /// Start the generator with an arbitrary [`Producer`].
    pub fn start_producer<P>(&mut self, producer: P) -> Result<()>
    where
        P: Producer<Item = T>,
    {
        if self.state != GeneratorState::NotStarted {
            return Err(Error::invalid_state(messages::OP_START, self.state));
        }
        self.config.validate()?;

        let shared = Arc::new(Shared::new());
        let worker_shared = Arc::clone(&shared);
        let worker = self
            .config
            .thread_builder()
            .spawn(move || run_producer(producer, worker_shared))?;

        debug!(thread = %self.config.thread_name, "generator started");
        self.shared = Some(shared);
        self.worker = Some(worker);
        self.state = GeneratorState::Running;
        Ok(())
    }

    /// A handle that can stop this generator from another thread.
    ///
    /// `None` unless the generator is running.
    pub fn stop_handle(&self) -> Option<StopHandle> {
        let shared = self.shared.as_ref()?;
        let shared: Arc<dyn Cancel> = Arc::clone(shared) as Arc<dyn Cancel>;
        Some(StopHandle { shared })
    }
}

fn run_producer<P: Producer>(mut producer: P, shared: Arc<Shared<P::Item>>) {
    let mut yielded: u64 = 0;
    let failure = loop {
        match panic::catch_unwind(AssertUnwindSafe(|| producer.step())) {
            Ok(Ok(Some(value))) => {
                if !shared.offer(value) {
                    debug!(yielded, "producer cancelled");
                    break None;
                }
                yielded += 1;
                trace!(yielded, "element handed off");
            }
            Ok(Ok(None)) => {
                debug!(yielded, "producer exhausted");
                break None;
            }
            Ok(Err(e)) => {
                warn!(yielded, error = %e, "step function failed");
                break Some(e);
            }
            Err(payload) => {
                let e = Error::from_panic(payload);
                warn!(yielded, error = %e, "step function panicked");
                break Some(e);
            }
        }
    };

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| producer.finish())) {
        error!(error = %Error::from_panic(payload), "finalizer panicked");
    }
    shared.finish(failure);
}

impl<T: Default + Send + 'static> Generator for BaseGenerator<T> {
    type Item = T;

    fn next(&mut self) -> Result<IteratorResult<T>> {
        match self.state {
            GeneratorState::NotStarted => Err(Error::invalid_state(
                messages::OP_NEXT,
                GeneratorState::NotStarted,
            )),
            GeneratorState::Stopped => Ok(IteratorResult::exhausted()),
            GeneratorState::Running => {
                let taken = match self.shared.as_ref() {
                    Some(shared) => shared.take(),
                    None => Taken::Finished(None),
                };
                match taken {
                    Taken::Element(value) => Ok(IteratorResult::yielded(value)),
                    Taken::Finished(failure) => {
                        self.settle();
                        match failure {
                            Some(e) => Err(e),
                            None => Ok(IteratorResult::exhausted()),
                        }
                    }
                }
            }
        }
    }

    fn stop(&mut self) {
        self.shutdown();
    }
}

impl<T> Default for BaseGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for BaseGenerator<T> {
    fn drop(&mut self) {
        if self.state == GeneratorState::Running {
            self.shutdown();
        }
    }
}

impl<T> fmt::Debug for BaseGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseGenerator")
            .field("state", &self.state)
            .field("thread_name", &self.config.thread_name)
            .finish()
    }
}
