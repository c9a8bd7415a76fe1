//! Core functionality for Bramble property-based testing.
//!
//! This crate provides the building blocks: a replayable random source,
//! lazy streams and shrink trees, the generator combinators, the
//! minimization search and the property runner.

pub mod data;
pub mod error;
pub mod gen;
pub mod property;
pub mod random;
pub mod shrink;
pub mod stream;
pub mod tree;

// Re-export the main types
pub use data::*;
pub use error::*;
pub use gen::*;
pub use property::*;
pub use random::Random;
pub use shrink::{minimize, Minimized, Trees};
pub use stream::Stream;
pub use tree::Tree;
