//! Lazyseq: lazy sequences backed by producer threads
//!
//! A generator produces elements one at a time, on demand. The producer runs
//! its step function on its own thread while the consumer pulls at its own
//! pace; the two meet at a rendezvous slot that holds at most one element.
//!
//! # Quick Start
//!
//! ```
//! use lazyseq::prelude::*;
//!
//! fn main() -> lazyseq::Result<()> {
//!     let words = from_sequence(vec!["lazy", "seq"])?;
//!     let mut lengths = words.map(|w: &str| w.len())?;
//!     assert_eq!(lengths.drain()?, vec![4, 3]);
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Contract** | [`generator`], [`error`](Error) |
//! | **Engine** | [`engine`], [`config`] |
//! | **Building blocks** | [`sources`], [`combinators`], [`keyed`] |
//! | **Binaries** | [`logging`] |

pub mod combinators;
pub mod config;
pub mod engine;
pub mod generator;
pub mod keyed;
pub mod logging;
pub mod prelude;
pub mod sources;

mod error;

pub use error::{messages, Error, ErrorKind, Result};
pub use engine::{BaseGenerator, StopHandle};
pub use generator::{Generator, GeneratorExt, GeneratorState, IteratorResult};

/// Lazyseq version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
