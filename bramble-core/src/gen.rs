//! Generator combinators for property-based testing.

use crate::error::{Error, Result};
use crate::random::Random;
use crate::stream::Stream;
use crate::tree::Tree;
use std::rc::Rc;
use tracing::{debug, trace};

pub mod construct;
pub mod one_of;
pub mod primitives;
pub mod tuple;

pub use construct::*;
pub use one_of::*;
pub use tuple::*;

/// How many times a retrying combinator redraws before it gives the
/// discard back to its caller.
pub const RETRY_LIMIT: usize = 1000;

type GenFn<T> = Rc<dyn Fn(&mut Random) -> Result<Tree<T>>>;
type Derive<T, U> = Rc<dyn Fn(&T) -> Gen<U>>;

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values that can be composed
/// using combinator functions. A generator is a pure function from a
/// [`Random`] to a shrink [`Tree`]: given the same random state it always
/// builds the same tree, which is what makes failures replayable.
pub struct Gen<T> {
    generator: GenFn<T>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            generator: self.generator.clone(),
        }
    }
}

impl<T> Gen<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Random) -> Result<Tree<T>> + 'static,
    {
        Gen {
            generator: Rc::new(f),
        }
    }

    /// Generate a shrink tree, advancing `random`.
    pub fn generate(&self, random: &mut Random) -> Result<Tree<T>> {
        (self.generator)(random)
    }
}

impl<T> Gen<T>
where
    T: Clone + 'static,
{
    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self {
        Gen::new(move |_random| Ok(Tree::singleton(value.clone())))
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        let f = Rc::new(f);
        Gen::new(move |random| {
            let f = f.clone();
            Ok(self.generate(random)?.map(move |value| f(value.clone())))
        })
    }

    /// Keep only values satisfying `predicate`, redrawing on rejection.
    pub fn filter<F>(self, predicate: F) -> Gen<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter_with_tolerance(predicate, 0)
    }

    /// Like [`Gen::filter`], but a rejected shrink may be replaced by its own
    /// shrinks up to `tolerance` levels deep.
    pub fn filter_with_tolerance<F>(self, predicate: F, tolerance: usize) -> Gen<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        let predicate = Rc::new(predicate);
        Gen::new(move |random| {
            for attempt in 0..RETRY_LIMIT {
                let tree = match self.generate(random) {
                    Err(error) if error.is_discard() => continue,
                    other => other?,
                };
                let predicate = predicate.clone();
                match tree.filter(move |value| predicate(value), tolerance) {
                    Ok(filtered) => return Ok(filtered),
                    Err(Error::FilterRejected) => trace!(attempt, "filter rejected draw"),
                    Err(error) => return Err(error),
                }
            }
            debug!(limit = RETRY_LIMIT, "filter exhausted its retries");
            Err(Error::Discard)
        })
    }

    /// Draw a `T`, then a `U` from a generator built out of that `T`.
    ///
    /// Shrinking happens in two phases. The `T` shrinks first, and every
    /// shrunk `T` gets a freshly derived `U` drawn from the same random state
    /// the original `U` came from. Once no shrink of `T` is left to try, the
    /// `U` shrinks with `T` held fixed.
    pub fn pair_with<U, F>(self, f: F) -> Gen<(T, U)>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Gen<U> + 'static,
    {
        let derive: Derive<T, U> = Rc::new(f);
        Gen::new(move |random| {
            let first = self.generate(random)?;
            let saved = random.clone();
            let second = derive(first.value()).generate(random)?;
            Ok(dependent(first, second, derive.clone(), saved))
        })
    }

    /// Generate a value from a generator chosen by a previously generated
    /// value, keeping only the derived value.
    pub fn flat_map<U, F>(self, f: F) -> Gen<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Gen<U> + 'static,
    {
        self.pair_with(f).map(|(_, derived)| derived)
    }

    /// Pair this generator with an independent one.
    pub fn zip<U>(self, other: Gen<U>) -> Gen<(T, U)>
    where
        U: Clone + 'static,
    {
        tuple((self, other))
    }
}

/// Free-function form of [`Gen::pair_with`].
pub fn dependency<T, U, F>(gen: Gen<T>, f: F) -> Gen<(T, U)>
where
    T: Clone + 'static,
    U: Clone + 'static,
    F: Fn(&T) -> Gen<U> + 'static,
{
    gen.pair_with(f)
}

fn dependent<T, U>(
    first: Tree<T>,
    second: Tree<U>,
    derive: Derive<T, U>,
    saved: Random,
) -> Tree<(T, U)>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let value = (first.value().clone(), second.value().clone());
    Tree::singleton(value).with(move || {
        let rederive = derive.clone();
        let replay = saved.clone();
        let shrink_first = first.children().flat_transform(move |shrunk| {
            let mut random = replay.clone();
            match rederive(shrunk.value()).generate(&mut random) {
                Ok(fresh) => Stream::one(dependent(
                    shrunk.clone(),
                    fresh,
                    rederive.clone(),
                    replay.clone(),
                )),
                Err(error) => {
                    trace!(%error, "dropping shrink whose dependent value could not be rebuilt");
                    Stream::empty()
                }
            }
        });

        let fixed = first.value().clone();
        let second = second.clone();
        shrink_first.concat_with(move || {
            let fixed = fixed.clone();
            second.children().transform(move |shrunk| {
                let fixed = fixed.clone();
                shrunk.map(move |value| (fixed.clone(), value.clone()))
            })
        })
    })
}

impl<A, B> Gen<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    /// Extend a dependent pair with a value derived from both components.
    pub fn chain<C, F>(self, f: F) -> Gen<(A, B, C)>
    where
        C: Clone + 'static,
        F: Fn(&(A, B)) -> Gen<C> + 'static,
    {
        self.pair_with(f).map(|((a, b), c)| (a, b, c))
    }
}

impl<A, B, C> Gen<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    /// Extend a dependent triple with a value derived from all components.
    pub fn chain<D, F>(self, f: F) -> Gen<(A, B, C, D)>
    where
        D: Clone + 'static,
        F: Fn(&(A, B, C)) -> Gen<D> + 'static,
    {
        self.pair_with(f).map(|((a, b, c), d)| (a, b, c, d))
    }
}

impl<A, B, C, D> Gen<(A, B, C, D)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    D: Clone + 'static,
{
    /// Extend a dependent quadruple with a value derived from all components.
    pub fn chain<E, F>(self, f: F) -> Gen<(A, B, C, D, E)>
    where
        E: Clone + 'static,
        F: Fn(&(A, B, C, D)) -> Gen<E> + 'static,
    {
        self.pair_with(f).map(|((a, b, c, d), e)| (a, b, c, d, e))
    }
}
