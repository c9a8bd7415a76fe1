//! Lazy stream properties

use crate::meta_config;
use bramble::*;

fn small_vec() -> Gen<Vec<u8>> {
    Gen::vec_of(Gen::<u8>::interval(0, 20), 0, 8)
}

/// Property: Forcing a transformed stream twice gives the same elements
pub fn test_transform_is_repeatable() {
    let prop = for_all_named(small_vec(), "values", |values: &Vec<u8>| {
        let doubled = Stream::from_vec(values.clone()).transform(|x| u16::from(*x) * 2);
        let first = doubled.to_vec(usize::MAX);
        let second = doubled.to_vec(usize::MAX);
        first == second && first.iter().zip(values).all(|(d, v)| *d == u16::from(*v) * 2)
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Transform repeatability property passed"),
        result => panic!("Transform repeatability property failed: {result}"),
    }
}

/// Property: take and concat produce the expected lengths
pub fn test_take_and_concat_lengths() {
    let prop = for_all(
        (small_vec(), small_vec(), Gen::<usize>::interval(0, 10)),
        |(left, right, n): &(Vec<u8>, Vec<u8>, usize)| {
            let joined = Stream::from_vec(left.clone()).concat(&Stream::from_vec(right.clone()));
            let mut expected = left.clone();
            expected.extend(right);
            joined.to_vec(usize::MAX) == expected
                && joined.take(*n).to_vec(usize::MAX).len() == (*n).min(expected.len())
        },
    );

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Take and concat property passed"),
        result => panic!("Take and concat property failed: {result}"),
    }
}
