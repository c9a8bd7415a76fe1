//! Positional construction properties

use crate::{arbitrary_seed, meta_config};
use bramble::*;

#[derive(Debug, Clone, PartialEq)]
struct Order {
    quantity: u16,
    item: String,
    gift: bool,
}

impl Construct<(u16, String, bool)> for Order {
    fn construct((quantity, item, gift): (u16, String, bool)) -> Self {
        Order {
            quantity,
            item,
            gift,
        }
    }
}

/// Property: Explicit generators drive their positions through every shrink
pub fn test_construct_respects_explicit_generators() {
    let prop = for_all_named(arbitrary_seed(), "seed", |&seed: &u64| {
        let orders = construct::<Order, (u16, String, bool), _>((
            Gen::<u16>::interval(1, 10),
            Gen::element_of(vec!["tea".to_string(), "coffee".to_string()]),
        ));
        let Ok(tree) = orders.generate(&mut Random::from_seed(seed)) else {
            return false;
        };
        tree.shrinks(100).iter().all(|order| {
            (1..=10).contains(&order.quantity) && (order.item == "tea" || order.item == "coffee")
        })
    });

    match prop.run(&meta_config()) {
        TestResult::Pass { .. } => println!("✓ Construct explicit generators property passed"),
        result => panic!("Construct explicit generators property failed: {result}"),
    }
}
