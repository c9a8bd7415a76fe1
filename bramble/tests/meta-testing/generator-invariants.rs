//! Generator invariant properties
//!
//! A copied random source must replay exactly, and bounded draws must stay
//! inside their bounds at every depth of the shrink tree.

use crate::{arbitrary_seed, meta_config};
use bramble::*;

/// Property: Generating from a copy reproduces the original tree
pub fn test_replay_from_copy() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let gen = Gen::vec_of(Gen::<i32>::interval(-50, 50), 0, 6);
        let mut random = Random::from_seed(seed);
        let _ = gen.generate(&mut random);

        let copy = random.clone();
        let original = gen.generate(&mut random).map(|tree| tree.expand(2));
        let replayed = gen.generate(&mut copy.clone()).map(|tree| tree.expand(2));
        original == replayed
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Replay from copy property passed"),
        result => panic!("Replay from copy property failed: {result}"),
    }
}

/// Property: Every shrink of an interval draw stays in the interval
pub fn test_interval_bounds() {
    let bounds =
        Gen::<i64>::interval(-1000, 1000).pair_with(|&low| Gen::<i64>::interval(low, 1000));
    let prop = for_all_named(
        (bounds, arbitrary_seed()),
        "((low, high), seed)",
        |&((low, high), seed): &((i64, i64), u64)| {
            let tree = Gen::<i64>::interval(low, high)
                .generate(&mut Random::from_seed(seed))
                .map_err(|error| error.to_string())?;
            Ok::<_, String>(tree.shrinks(200).iter().all(|x| (low..=high).contains(x)))
        },
    );

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Interval bounds property passed"),
        result => panic!("Interval bounds property failed: {result}"),
    }
}
