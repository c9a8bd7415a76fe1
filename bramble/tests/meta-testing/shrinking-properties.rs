//! Shrinking correctness properties
//!
//! These properties ensure that minimization terminates at counterexamples
//! no single shrink step can improve on.

use crate::{arbitrary_seed, meta_config};
use bramble::*;
use pretty_assertions::assert_eq;

/// Property: The minimized value still fails and none of its shrinks do
pub fn test_minimization_is_locally_minimal() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let inner = for_all(Gen::<i64>::interval(-1000, 1000), |&x| x.abs() <= 50);
        match inner.run(&Config::default().with_seed(seed)) {
            TestResult::Fail { counterexample, .. } => {
                counterexample == "51" || counterexample == "-51"
            }
            TestResult::Pass { .. } => true,
            _ => false,
        }
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Local minimality property passed"),
        result => panic!("Local minimality property failed: {result}"),
    }
}

/// The documented replay scenario: seed 42 finds and shrinks to 90.
pub fn test_boundary_counterexample() {
    let prop = for_all(Gen::<i32>::interval(0, 100), |&x| x < 90);
    match prop.run(&Config::default().with_seed(42)) {
        TestResult::Fail { counterexample, .. } => assert_eq!(counterexample, "90"),
        result => panic!("expected a counterexample, got {result}"),
    }
}

/// Two strings whose lengths together must stay below five shrink until
/// they total exactly five.
pub fn test_string_lengths_minimized_together() {
    let strings = (
        Gen::<String>::ascii_alpha(12),
        Gen::<String>::ascii_alpha(12),
    );
    let prop = for_all(strings, |(a, b): &(String, String)| a.len() + b.len() < 5);

    for seed in 0..10 {
        match prop.run(&Config::default().with_seed(seed)) {
            TestResult::Fail {
                counterexample,
                shrink_steps,
                ..
            } => {
                let letters = counterexample.chars().filter(char::is_ascii_alphabetic).count();
                assert_eq!(letters, 5, "seed {seed}: {counterexample}");
                assert!(shrink_steps.iter().all(|step| step.position < 2));
            }
            result => panic!("seed {seed}: expected a counterexample, got {result}"),
        }
    }
}
