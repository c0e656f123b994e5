//! Prelude module for convenient imports
//!
//! ```
//! use lazyseq::prelude::*;
//!
//! fn main() -> lazyseq::Result<()> {
//!     let mut g = from_iter(1..=3)?;
//!     assert_eq!(g.drain()?, vec![1, 2, 3]);
//!     Ok(())
//! }
//! ```

// Contract
pub use crate::generator::{
    FnProducer, Generator, GeneratorExt, GeneratorState, IteratorResult, Producer,
};

// Engine
pub use crate::config::GeneratorConfig;
pub use crate::engine::{BaseGenerator, StopHandle};

// Error handling
pub use crate::error::{Error, ErrorKind, Result};

// Sources and combinators
pub use crate::combinators::{drain, flatten, map};
pub use crate::keyed::{FxKeyedSource, KeyedSource};
pub use crate::sources::{from_fn, from_iter, from_sequence};
