//! Distribution validation for weighted choice

use bramble::*;

/// Explicit weights are honored and unassigned weights share the rest.
pub fn test_weighted_choice_frequencies() {
    let gen = Gen::one_of(vec![
        weighted(Gen::constant('a'), 0.6),
        Gen::constant('b').into(),
        Gen::constant('c').into(),
    ])
    .unwrap_or_else(|error| panic!("valid weights rejected: {error}"));

    let draws = 30_000;
    let mut random = Random::from_seed(99);
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        match gen.generate(&mut random).map(|tree| *tree.value()) {
            Ok('a') => counts[0] += 1,
            Ok('b') => counts[1] += 1,
            Ok('c') => counts[2] += 1,
            other => panic!("unexpected draw {other:?}"),
        }
    }

    let expected = [0.6, 0.2, 0.2];
    for (count, expected) in counts.iter().zip(expected) {
        let observed = *count as f64 / draws as f64;
        assert!(
            (observed - expected).abs() < 0.02,
            "observed {observed}, expected {expected}"
        );
    }
    println!("✓ Weighted choice frequencies within tolerance");
}
