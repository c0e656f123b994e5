//! Generator Combinators
//!
//! Composition built purely on the [`Generator`] contract:
//! - [`map`] transforms each element of a source
//! - [`flatten`] expands each element into a sub-generator and chains them
//! - [`drain`] eagerly collects whatever remains
//!
//! `map` and `flatten` run their own producer thread that pulls from the
//! wrapped generators, so each stage holds at most one element in flight.
//! Failures from wrapped generators propagate unchanged.

use crate::config::GeneratorConfig;
use crate::engine::BaseGenerator;
use crate::error::Result;
use crate::generator::{Generator, Producer};

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Producer behind [`map`].
pub struct MapProducer<G, F> {
    source: G,
    transform: F,
}

impl<G, L, F> Producer for MapProducer<G, F>
where
    G: Generator + Send + 'static,
    G::Item: Send + 'static,
    L: Send + 'static,
    F: FnMut(G::Item) -> L + Send + 'static,
{
    type Item = L;

    fn step(&mut self) -> Result<Option<L>> {
        let result = self.source.next()?;
        if result.done {
            return Ok(None);
        }
        Ok(Some((self.transform)(result.value)))
    }

    fn finish(&mut self) {
        self.source.stop();
    }
}

/// Generator of `f(x)` for every `x` pulled from `source`.
///
/// One element is pulled from `source` per element produced; stopping the
/// result stops `source`.
pub fn map<G, L, F>(source: G, f: F) -> Result<BaseGenerator<L>>
where
    G: Generator + Send + 'static,
    G::Item: Send + 'static,
    L: Send + 'static,
    F: FnMut(G::Item) -> L + Send + 'static,
{
    BaseGenerator::from_producer(
        MapProducer {
            source,
            transform: f,
        },
        GeneratorConfig::named("lazyseq-map"),
    )
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Producer behind [`flatten`].
pub struct FlattenProducer<G, I, F> {
    outer: G,
    inner: Option<I>,
    expand: F,
}

impl<G, I, F> Producer for FlattenProducer<G, I, F>
where
    G: Generator + Send + 'static,
    G::Item: Send + 'static,
    I: Generator + Send + 'static,
    I::Item: Send + 'static,
    F: FnMut(G::Item) -> Result<I> + Send + 'static,
{
    type Item = I::Item;

    fn step(&mut self) -> Result<Option<I::Item>> {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                let result = inner.next()?;
                if !result.done {
                    return Ok(Some(result.value));
                }
                self.inner = None;
            }

            let result = self.outer.next()?;
            if result.done {
                return Ok(None);
            }
            // an inner generator that is empty from the start is skipped
            self.inner = Some((self.expand)(result.value)?);
        }
    }

    fn finish(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            inner.stop();
        }
        self.outer.stop();
    }
}

/// Generator of every element of `expand(x)` for each `x` in `outer`.
///
/// Elements come out as all of `expand(outer[0])`, then all of
/// `expand(outer[1])`, and so on. Empty sub-generators contribute nothing.
/// Stopping the result stops both `outer` and the active sub-generator.
pub fn flatten<G, I, F>(outer: G, expand: F) -> Result<BaseGenerator<I::Item>>
where
    G: Generator + Send + 'static,
    G::Item: Send + 'static,
    I: Generator + Send + 'static,
    I::Item: Send + 'static,
    F: FnMut(G::Item) -> Result<I> + Send + 'static,
{
    BaseGenerator::from_producer(
        FlattenProducer {
            outer,
            inner: None,
            expand,
        },
        GeneratorConfig::named("lazyseq-flatten"),
    )
}

// ---------------------------------------------------------------------------
// Eager drain
// ---------------------------------------------------------------------------

/// Pull `generator` until exhaustion, collecting elements in order.
///
/// Does not call `stop()`; an exhausted generator has already finalized.
pub fn drain<G: Generator + ?Sized>(generator: &mut G) -> Result<Vec<G::Item>> {
    let mut items = Vec::new();
    loop {
        let result = generator.next()?;
        if result.done {
            return Ok(items);
        }
        items.push(result.value);
    }
}
