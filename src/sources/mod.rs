//! Generator Sources
//!
//! Ready-made producers for common cases:
//! - [`from_sequence`] walks a fixed, shared sequence by index
//! - [`from_iter`] drives an owned [`Iterator`] on the producer thread
//! - [`from_fn`] wraps a bare step closure with no cleanup

use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::engine::BaseGenerator;
use crate::error::Result;
use crate::generator::{FnProducer, Producer};

/// Walks a shared slice by index. The slice is never modified.
pub struct SequenceProducer<T> {
    items: Arc<[T]>,
    index: usize,
}

impl<T> SequenceProducer<T> {
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self {
            items: items.into(),
            index: 0,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Producer for SequenceProducer<T> {
    type Item = T;

    fn step(&mut self) -> Result<Option<T>> {
        let item = self.items.get(self.index).cloned();
        if item.is_some() {
            self.index += 1;
        }
        Ok(item)
    }
}

/// Generator yielding every element of `items` once, in order.
pub fn from_sequence<T>(items: impl Into<Arc<[T]>>) -> Result<BaseGenerator<T>>
where
    T: Clone + Send + Sync + 'static,
{
    BaseGenerator::from_producer(
        SequenceProducer::new(items),
        GeneratorConfig::named("lazyseq-sequence"),
    )
}

/// Drives an owned iterator; dropping it is the only cleanup.
pub struct IterProducer<I> {
    iter: Option<I>,
}

impl<I> Producer for IterProducer<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    type Item = I::Item;

    fn step(&mut self) -> Result<Option<I::Item>> {
        Ok(self.iter.as_mut().and_then(Iterator::next))
    }

    fn finish(&mut self) {
        self.iter = None;
    }
}

/// Generator over an owned iterator, advanced lazily on the producer thread.
pub fn from_iter<I>(iter: I) -> Result<BaseGenerator<I::Item>>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    BaseGenerator::from_producer(
        IterProducer {
            iter: Some(iter.into_iter()),
        },
        GeneratorConfig::named("lazyseq-iter"),
    )
}

/// Generator from a step closure alone.
pub fn from_fn<T, S>(step: S) -> Result<BaseGenerator<T>>
where
    T: Send + 'static,
    S: FnMut() -> Result<Option<T>> + Send + 'static,
{
    BaseGenerator::from_producer(FnProducer::new(step, || {}), GeneratorConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::generator::{Generator, GeneratorExt, IteratorResult};

    #[test]
    fn test_sequence_in_order_then_default() {
        let mut g = from_sequence(vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1]).unwrap();
        for i in 0..10 {
            let r = g.next().unwrap();
            assert!(!r.done);
            assert_eq!(r.value + i, 10);
        }
        assert_eq!(g.next().unwrap(), IteratorResult { value: 0, done: true });
    }

    #[test]
    fn test_sequence_does_not_touch_backing_slice() {
        let backing: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
        let mut first = from_sequence(Arc::clone(&backing)).unwrap();
        let mut second = from_sequence(Arc::clone(&backing)).unwrap();

        assert_eq!(first.drain().unwrap(), vec!["a", "b"]);
        assert_eq!(second.next().unwrap().value, "a");
        assert_eq!(&*backing, &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_sequence() {
        let mut g = from_sequence(Vec::<u8>::new()).unwrap();
        assert_eq!(g.next().unwrap(), IteratorResult { value: 0, done: true });
    }

    #[test]
    fn test_from_iter_is_lazy() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let mut g = from_iter((0..).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        assert_eq!(g.next().unwrap().value, 0);
        assert_eq!(g.next().unwrap().value, 1);
        g.stop();
        assert!(pulled.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_from_fn_propagates_failure() {
        let mut n = 0;
        let mut g = from_fn(move || {
            n += 1;
            if n > 2 {
                Err(Error::step_failed("out of input"))
            } else {
                Ok(Some(n))
            }
        })
        .unwrap();

        let items: Vec<Result<i32>> = g.iter().collect();
        assert_eq!(items.len(), 3);
        assert!(items[2].as_ref().unwrap_err().is_step_failure());
    }
}
