//! Building values positionally from per-parameter generators.
//!
//! [`construct`] draws one value per constructor parameter and hands the
//! tuple to [`Construct::construct`]. Generators supplied by the caller take
//! the leading parameter positions; the remaining ones come from
//! [`Arbitrary`]. Ownership forms such as `Box<T>` or `Rc<T>` have their own
//! `Arbitrary` impls, so a parameter is always drawn in exactly the form the
//! constructor takes.

use super::{tuple, Gen};
use std::rc::Rc;
use std::sync::Arc;

/// Types with a default generator.
pub trait Arbitrary: Clone + 'static {
    fn arbitrary() -> Gen<Self>;
}

/// Types that can be built from a tuple of parameters.
///
/// `#[derive(Construct)]` from `bramble-derive` implements this for structs,
/// with the fields in declaration order as the parameters.
pub trait Construct<Args>: Sized {
    fn construct(args: Args) -> Self;
}

/// A prefix of parameter generators, completed with defaults.
pub trait FillParams<Args> {
    fn fill(self) -> Gen<Args>;
}

/// Generate a `T` from explicit leading generators plus defaults.
pub fn construct<T, Args, E>(explicit: E) -> Gen<T>
where
    T: Construct<Args> + Clone + 'static,
    Args: Clone + 'static,
    E: FillParams<Args>,
{
    explicit.fill().map(T::construct)
}

macro_rules! arbitrary_integral {
    ($($t:ty),+) => {
        $(
            impl Arbitrary for $t {
                fn arbitrary() -> Gen<Self> {
                    Gen::<$t>::any()
                }
            }
        )+
    };
}

arbitrary_integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Length bound for default-generated collections.
const DEFAULT_MAX_LEN: usize = 16;

impl Arbitrary for bool {
    fn arbitrary() -> Gen<Self> {
        Gen::bool()
    }
}

impl Arbitrary for char {
    fn arbitrary() -> Gen<Self> {
        Gen::<char>::ascii_alpha()
    }
}

impl Arbitrary for String {
    fn arbitrary() -> Gen<Self> {
        Gen::<String>::ascii_alpha(DEFAULT_MAX_LEN)
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary() -> Gen<Self> {
        Gen::vec_of(T::arbitrary(), 0, DEFAULT_MAX_LEN)
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    fn arbitrary() -> Gen<Self> {
        // Absent values shrink to `None` first.
        Gen::bool().pair_with(|&present| {
            if present {
                T::arbitrary().map(Some)
            } else {
                Gen::constant(None)
            }
        })
        .map(|(_, value)| value)
    }
}

impl<T: Arbitrary> Arbitrary for Box<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().map(Box::new)
    }
}

impl<T: Arbitrary> Arbitrary for Rc<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().map(Rc::new)
    }
}

impl<T: Arbitrary> Arbitrary for Arc<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().map(Arc::new)
    }
}

macro_rules! fill_params {
    ([$($given:ident : $var:ident),*] [$($default:ident),*]) => {
        impl<$($given,)* $($default,)*> FillParams<($($given,)* $($default,)*)>
            for ($(Gen<$given>,)*)
        where
            $($given: Clone + 'static,)*
            $($default: Arbitrary,)*
        {
            fn fill(self) -> Gen<($($given,)* $($default,)*)> {
                let ($($var,)*) = self;
                tuple(($($var,)* $($default::arbitrary(),)*))
            }
        }
    };
}

fill_params!([] [A]);
fill_params!([A: a] []);
fill_params!([] [A, B]);
fill_params!([A: a] [B]);
fill_params!([A: a, B: b] []);
fill_params!([] [A, B, C]);
fill_params!([A: a] [B, C]);
fill_params!([A: a, B: b] [C]);
fill_params!([A: a, B: b, C: c] []);
fill_params!([] [A, B, C, D]);
fill_params!([A: a] [B, C, D]);
fill_params!([A: a, B: b] [C, D]);
fill_params!([A: a, B: b, C: c] [D]);
fill_params!([A: a, B: b, C: c, D: d] []);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Random;

    #[derive(Debug, Clone, PartialEq)]
    struct Account {
        id: u32,
        owner: String,
        limit: Box<i64>,
    }

    impl Construct<(u32, String, Box<i64>)> for Account {
        fn construct((id, owner, limit): (u32, String, Box<i64>)) -> Self {
            Account { id, owner, limit }
        }
    }

    #[test]
    fn test_explicit_generators_fill_leading_positions() {
        let gen = construct::<Account, (u32, String, Box<i64>), _>((
            Gen::<u32>::interval(1, 9),
            Gen::constant("root".to_string()),
        ));
        let mut random = Random::from_seed(10);
        for _ in 0..30 {
            let tree = gen.generate(&mut random).unwrap();
            let account = tree.value();
            assert!((1..=9).contains(&account.id));
            assert_eq!(account.owner, "root");
        }
    }

    #[test]
    fn test_defaults_fill_every_position() {
        let gen = construct::<Account, (u32, String, Box<i64>), _>(());
        let tree = gen.generate(&mut Random::from_seed(4)).unwrap();
        assert!(tree.value().owner.len() <= DEFAULT_MAX_LEN);
    }

    #[test]
    fn test_constructed_values_shrink_through_parameters() {
        let gen = construct::<Account, (u32, String, Box<i64>), _>((
            Gen::<u32>::interval(0, 1000),
            Gen::constant(String::new()),
            Gen::constant(Box::new(0i64)),
        ));
        let mut random = Random::from_seed(19);
        let tree = loop {
            let tree = gen.generate(&mut random).unwrap();
            if tree.value().id > 0 {
                break tree;
            }
        };
        let first = tree.children().head().cloned().unwrap();
        assert_eq!(first.value().id, 0);
    }

    #[test]
    fn test_option_shrinks_to_none() {
        let mut random = Random::from_seed(1);
        for _ in 0..20 {
            let tree = Option::<u8>::arbitrary().generate(&mut random).unwrap();
            if tree.value().is_some() {
                assert_eq!(tree.children().head().map(|c| *c.value()), Some(None));
            }
        }
    }

    #[test]
    fn test_shared_pointer_forms() {
        let mut random = Random::from_seed(2);
        let rc = Rc::<u8>::arbitrary().generate(&mut random).unwrap();
        let arc = Arc::<u8>::arbitrary().generate(&mut random).unwrap();
        let _: (&u8, &u8) = (rc.value().as_ref(), arc.value().as_ref());
    }
}
