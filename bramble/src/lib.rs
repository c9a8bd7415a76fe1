//! Bramble property-based testing library.
//!
//! This is the main entry point for Bramble: it re-exports the engine from
//! `bramble-core` and, with the `derive` feature, the `Construct` and
//! `Arbitrary` derive macros.
//!
//! ```rust
//! use bramble::*;
//!
//! let prop = for_all(Gen::<i32>::interval(0, 100), |&x| x < 90);
//! match prop.run(&Config::default().with_seed(42)) {
//!     TestResult::Fail { counterexample, .. } => assert_eq!(counterexample, "90"),
//!     other => panic!("unexpected result: {other}"),
//! }
//! ```

pub use bramble_core::*;

// Re-export derive macros when available
#[cfg(feature = "derive")]
pub use bramble_derive::*;
