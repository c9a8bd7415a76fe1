//! Independent generators combined into tuples.

use super::Gen;
use crate::tree::Tree;

/// Combine two trees into a tree of pairs.
///
/// The left component shrinks first; once none of its shrinks is chosen,
/// the right component shrinks with the left held at its current value.
pub(crate) fn zip_trees<A, B>(left: Tree<A>, right: Tree<B>) -> Tree<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    let value = (left.value().clone(), right.value().clone());
    Tree::singleton(value).with(move || {
        let fixed_right = right.clone();
        let fixed_left = left.clone();
        let right = right.clone();
        left.children()
            .transform(move |shrunk| zip_trees(shrunk.clone(), fixed_right.clone()))
            .concat_with(move || {
                let fixed_left = fixed_left.clone();
                right
                    .children()
                    .transform(move |shrunk| zip_trees(fixed_left.clone(), shrunk.clone()))
            })
    })
}

/// A tuple of generators that can be drawn as one generator of tuples.
pub trait GenTuple {
    type Output: Clone + 'static;

    fn into_gen(self) -> Gen<Self::Output>;
}

/// Combine a tuple of independent generators into a generator of tuples.
pub fn tuple<G: GenTuple>(gens: G) -> Gen<G::Output> {
    gens.into_gen()
}

impl<A> GenTuple for (Gen<A>,)
where
    A: Clone + 'static,
{
    type Output = (A,);

    fn into_gen(self) -> Gen<(A,)> {
        self.0.map(|a| (a,))
    }
}

impl<A, B> GenTuple for (Gen<A>, Gen<B>)
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    type Output = (A, B);

    fn into_gen(self) -> Gen<(A, B)> {
        let (a, b) = self;
        Gen::new(move |random| {
            let left = a.generate(random)?;
            let right = b.generate(random)?;
            Ok(zip_trees(left, right))
        })
    }
}

macro_rules! gen_tuple {
    ($($name:ident : $var:ident),+ ; $last:ident : $last_var:ident) => {
        impl<$($name,)+ $last> GenTuple for ($(Gen<$name>,)+ Gen<$last>)
        where
            $($name: Clone + 'static,)+
            $last: Clone + 'static,
        {
            type Output = ($($name,)+ $last);

            fn into_gen(self) -> Gen<Self::Output> {
                let ($($var,)+ $last_var) = self;
                tuple((tuple(($($var,)+)), $last_var))
                    .map(|(($($var,)+), $last_var)| ($($var,)+ $last_var))
            }
        }
    };
}

gen_tuple!(A: a, B: b; C: c);
gen_tuple!(A: a, B: b, C: c; D: d);
gen_tuple!(A: a, B: b, C: c, D: d; E: e);
