//! Generator combinator properties
//!
//! These properties ensure that map, filter and dependency behave correctly
//! and keep their laws over whole shrink trees, not just root values.

use crate::{arbitrary_seed, meta_config};
use bramble::*;

/// Property: Map composition law (map f . map g = map (f . g))
pub fn test_map_composition() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let twice = Gen::<i32>::interval(0, 20)
            .map(|x| x + 1)
            .map(|x| x * 2)
            .generate(&mut Random::from_seed(seed));
        let composed = Gen::<i32>::interval(0, 20)
            .map(|x| (x + 1) * 2)
            .generate(&mut Random::from_seed(seed));

        twice.map(|tree| tree.expand(3)) == composed.map(|tree| tree.expand(3))
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Map composition property passed"),
        result => panic!("Map composition property failed: {result}"),
    }
}

/// Property: A filtered tree never offers a shrink violating its predicate
pub fn test_filter_keeps_every_shrink_valid() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let even = Gen::<i32>::interval(-200, 200).filter_with_tolerance(|x| x % 2 == 0, 1);
        match even.generate(&mut Random::from_seed(seed)) {
            Ok(tree) => tree.expand(4).iter().all(|x| x % 2 == 0),
            Err(error) => error.is_discard(),
        }
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Filter validity property passed"),
        result => panic!("Filter validity property failed: {result}"),
    }
}

/// Property: A dependent pair shrinks its first component before its second
pub fn test_dependency_shrinks_first_component_first() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let pair = dependency(Gen::<u32>::interval(1, 12), |&len| {
            Gen::vec_of(Gen::<u8>::interval(0, 9), len as usize, len as usize)
        });
        let Ok(tree) = pair.generate(&mut Random::from_seed(seed)) else {
            return false;
        };
        let (len, values) = tree.value().clone();

        let derived_stay_consistent = tree
            .expand(2)
            .iter()
            .all(|(n, v)| v.len() == *n as usize);
        let first_child_shrinks_len = match tree.children().head() {
            Some(child) => child.value().0 < len || len == 1,
            None => len == 1 && values.iter().all(|&x| x == 0),
        };
        derived_stay_consistent && first_child_shrinks_len
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Dependency ordering property passed"),
        result => panic!("Dependency ordering property failed: {result}"),
    }
}
