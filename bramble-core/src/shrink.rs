//! Greedy minimization of failing inputs.
//!
//! Each argument position is shrunk in turn. At a position the search looks
//! at the current node's children in order and moves to the first one that
//! still reproduces the failure, with every other position held at its
//! current value. When no child reproduces, the position is minimal and the
//! search moves on. The result is locally minimal, not globally optimal.

use crate::error::ShrinkStep;
use crate::stream::Stream;
use crate::tree::Tree;
use std::fmt::Debug;
use tracing::{debug, trace};

/// The shrink trees of one trial's arguments, one search position each.
pub trait Trees: Clone + 'static {
    /// The argument values handed to the property.
    type Values;

    /// Number of independently shrunk positions.
    fn arity(&self) -> usize;

    fn values(&self) -> Self::Values;

    /// The candidates obtained by shrinking only `position`.
    fn shrink_at(&self, position: usize) -> Stream<Self>;
}

impl<A> Trees for Tree<A>
where
    A: Clone + 'static,
{
    type Values = A;

    fn arity(&self) -> usize {
        1
    }

    fn values(&self) -> A {
        self.value().clone()
    }

    fn shrink_at(&self, position: usize) -> Stream<Self> {
        if position == 0 {
            self.children()
        } else {
            Stream::empty()
        }
    }
}

macro_rules! tuple_trees {
    ($arity:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name),+> Trees for ($(Tree<$name>,)+)
        where
            $($name: Clone + 'static,)+
        {
            type Values = ($($name,)+);

            fn arity(&self) -> usize {
                $arity
            }

            fn values(&self) -> Self::Values {
                ($(self.$idx.value().clone(),)+)
            }

            fn shrink_at(&self, position: usize) -> Stream<Self> {
                match position {
                    $(
                        $idx => {
                            let base = self.clone();
                            self.$idx.children().transform(move |shrunk| {
                                let mut next = base.clone();
                                next.$idx = shrunk.clone();
                                next
                            })
                        }
                    )+
                    _ => Stream::empty(),
                }
            }
        }
    };
}

tuple_trees!(2; A: 0, B: 1);
tuple_trees!(3; A: 0, B: 1, C: 2);
tuple_trees!(4; A: 0, B: 1, C: 2, D: 3);
tuple_trees!(5; A: 0, B: 1, C: 2, D: 3, E: 4);

/// The outcome of a minimization.
#[derive(Debug, Clone)]
pub struct Minimized<S> {
    /// The trees at the minimal counterexample.
    pub trees: S,
    /// Number of shrinks accepted.
    pub shrinks: usize,
    /// The original counterexample followed by every accepted shrink.
    pub steps: Vec<ShrinkStep>,
}

/// Shrink `trees` while `reproduces` keeps returning true.
///
/// At most `shrink_limit` shrinks are accepted.
pub fn minimize<S, F>(trees: S, shrink_limit: usize, mut reproduces: F) -> Minimized<S>
where
    S: Trees,
    S::Values: Debug,
    F: FnMut(&S::Values) -> bool,
{
    let mut current = trees;
    let mut shrinks = 0;
    let mut steps = vec![ShrinkStep {
        counterexample: format!("{:?}", current.values()),
        step: 0,
        position: 0,
    }];

    'positions: for position in 0..current.arity() {
        loop {
            if shrinks >= shrink_limit {
                debug!(shrink_limit, "shrink limit reached");
                break 'positions;
            }

            let next = current
                .shrink_at(position)
                .iter()
                .find(|candidate| reproduces(&candidate.values()));
            let Some(next) = next else {
                trace!(position, "position is minimal");
                break;
            };

            current = next;
            shrinks += 1;
            let counterexample = format!("{:?}", current.values());
            trace!(position, step = shrinks, %counterexample, "accepted shrink");
            steps.push(ShrinkStep {
                counterexample,
                step: shrinks,
                position,
            });
        }
    }

    Minimized {
        trees: current,
        shrinks,
        steps,
    }
}
