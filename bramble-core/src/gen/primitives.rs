//! Primitive generators: booleans, integers, characters and sequences.
//!
//! Integers shrink toward the value of their range closest to zero by
//! repeated halving of the distance. Sequences shrink their length first,
//! then drop single elements, then shrink elements in place.

use super::Gen;
use crate::random::Random;
use crate::stream::Stream;
use crate::tree::Tree;
use std::rc::Rc;

/// Shrink candidates moving `x` toward `destination`: the destination itself,
/// then points halving the remaining distance, ending one step from `x`.
pub(crate) fn towards(destination: i128, x: i128) -> Stream<i128> {
    if destination == x {
        return Stream::empty();
    }
    let diff = x / 2 - destination / 2;
    let halves = Stream::unfold(diff, move |&d| (d != 0).then(|| (x - d, d / 2)));
    Stream::cons(destination, move || halves.filter(move |&c| c != destination))
}

pub(crate) fn integral_tree(value: i128, origin: i128) -> Tree<i128> {
    Tree::singleton(value).with(move || {
        towards(origin, value).transform(move |&shrunk| integral_tree(shrunk, origin))
    })
}

fn origin_of(min: i128, max: i128) -> i128 {
    if min > 0 {
        min
    } else if max < 0 {
        max
    } else {
        0
    }
}

macro_rules! integral_gen {
    ($($t:ty),+) => {
        $(
            impl Gen<$t> {
                /// Generate an integer in `[min, max]`, shrinking toward the
                /// value closest to zero.
                ///
                /// Panics immediately when `min > max`.
                pub fn interval(min: $t, max: $t) -> Self {
                    assert!(min <= max, "inverted range [{min}, {max}]");
                    let origin = origin_of(min as i128, max as i128);
                    Gen::new(move |random: &mut Random| {
                        let value = random.interval(min, max);
                        Ok(integral_tree(value as i128, origin).map(|&v| v as $t))
                    })
                }

                /// Generate any value of the type.
                pub fn any() -> Self {
                    Self::interval(<$t>::MIN, <$t>::MAX)
                }
            }
        )+
    };
}

integral_gen!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Gen<bool> {
    /// Generate a random boolean; `true` shrinks to `false`.
    pub fn bool() -> Self {
        Gen::new(|random| {
            let value = random.boolean(0.5);
            let children = if value {
                vec![Tree::singleton(false)]
            } else {
                Vec::new()
            };
            Ok(Tree::with_children(value, children))
        })
    }
}

impl<T> Gen<T>
where
    T: Clone + 'static,
{
    /// Pick one of the given values; later values shrink toward earlier ones.
    ///
    /// Panics if `values` is empty.
    pub fn element_of(values: Vec<T>) -> Self {
        assert!(!values.is_empty(), "element_of needs at least one value");
        let last = values.len() - 1;
        let values = Rc::new(values);
        Gen::<usize>::interval(0, last).map(move |index| values[index].clone())
    }
}

const ASCII_ALPHA: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

impl Gen<char> {
    /// Generate an ASCII letter, shrinking toward `'a'`.
    pub fn ascii_alpha() -> Self {
        Gen::element_of(ASCII_ALPHA.chars().collect())
    }
}

impl<T> Gen<Vec<T>>
where
    T: Clone + 'static,
{
    /// Generate a vector with a length in `[min_len, max_len]`.
    pub fn vec_of(element: Gen<T>, min_len: usize, max_len: usize) -> Self {
        assert!(min_len <= max_len, "inverted length range [{min_len}, {max_len}]");
        Gen::new(move |random| {
            let len = random.size_in_range(min_len, max_len + 1);
            let elements = (0..len)
                .map(|_| element.generate(random))
                .collect::<crate::error::Result<Vec<_>>>()?;
            Ok(sequence_tree(Rc::new(elements), min_len))
        })
    }
}

impl Gen<String> {
    /// Generate a string of characters drawn from `chars`.
    pub fn string_of(chars: Gen<char>, min_len: usize, max_len: usize) -> Self {
        Gen::vec_of(chars, min_len, max_len).map(|chars| chars.into_iter().collect())
    }

    /// Generate a string of ASCII letters of at most `max_len` characters.
    pub fn ascii_alpha(max_len: usize) -> Self {
        Self::string_of(Gen::<char>::ascii_alpha(), 0, max_len)
    }
}

fn sequence_tree<T>(elements: Rc<Vec<Tree<T>>>, min_len: usize) -> Tree<Vec<T>>
where
    T: Clone + 'static,
{
    let value = elements.iter().map(|tree| tree.value().clone()).collect();
    Tree::singleton(value).with(move || {
        let len = elements.len();

        let prefix_source = elements.clone();
        let prefixes = towards(min_len as i128, len as i128).transform(move |&shorter| {
            let prefix = prefix_source[..shorter as usize].to_vec();
            sequence_tree(Rc::new(prefix), min_len)
        });

        let removal_source = elements.clone();
        let removals = move || {
            let source = removal_source.clone();
            let positions = if len > min_len { len } else { 0 };
            Stream::unfold(0usize, move |&i| (i < positions).then(|| (i, i + 1))).transform(
                move |&i| {
                    let mut fewer = source.to_vec();
                    fewer.remove(i);
                    sequence_tree(Rc::new(fewer), min_len)
                },
            )
        };

        let element_source = elements.clone();
        let element_shrinks = move || {
            let source = element_source.clone();
            Stream::unfold(0usize, move |&i| (i < len).then(|| (i, i + 1))).flat_transform(
                move |&i| {
                    let source = source.clone();
                    source[i].children().transform(move |shrunk| {
                        let mut replaced = source.to_vec();
                        replaced[i] = shrunk.clone();
                        sequence_tree(Rc::new(replaced), min_len)
                    })
                },
            )
        };

        prefixes.concat_with(removals).concat_with(element_shrinks)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn candidates(destination: i128, x: i128) -> Vec<i128> {
        towards(destination, x).to_vec(256)
    }

    #[test]
    fn test_towards_halves_the_distance() {
        assert_eq!(candidates(0, 95), vec![0, 48, 72, 84, 90, 93, 94]);
        assert_eq!(candidates(0, -95), vec![0, -48, -72, -84, -90, -93, -94]);
        assert_eq!(candidates(0, 1), vec![0]);
        assert_eq!(candidates(10, 10), Vec::<i128>::new());
    }

    #[test]
    fn test_towards_ends_one_step_away() {
        for x in [2i128, 3, 17, 1000, -1000, i64::MAX as i128, i64::MIN as i128] {
            let list = candidates(0, x);
            assert_eq!(list.last().copied(), Some(x - x.signum()));
        }
    }

    #[test_case(-1000, 1000, 0; "straddles zero")]
    #[test_case(5, 50, 5; "positive range")]
    #[test_case(-50, -5, -5; "negative range")]
    fn test_integers_shrink_toward_origin(min: i64, max: i64, origin: i64) {
        let gen = Gen::<i64>::interval(min, max);
        let mut random = Random::from_seed(21);
        for _ in 0..100 {
            let tree = gen.generate(&mut random).unwrap();
            let value = *tree.value();
            assert!((min..=max).contains(&value));
            let first = tree.children().head().map(|child| *child.value());
            if value == origin {
                assert_eq!(first, None);
            } else {
                assert_eq!(first, Some(origin));
            }
            assert!(tree.expand(3).iter().all(|x| (min..=max).contains(x)));
        }
    }

    #[test]
    fn test_full_range_generators() {
        let mut random = Random::from_seed(8);
        let values: Vec<i64> = (0..1000)
            .map(|_| *Gen::<i64>::any().generate(&mut random).unwrap().value())
            .collect();
        assert!(values.iter().any(|&v| v < 0));
        assert!(values.iter().any(|&v| v > 0));

        let tree = Gen::<u64>::any().generate(&mut random).unwrap();
        assert!(tree.shrinks(100).iter().all(|&v| v < *tree.value()));
    }

    #[test]
    #[should_panic(expected = "inverted range")]
    fn test_inverted_interval_panics() {
        let _ = Gen::<i32>::interval(3, 2);
    }

    #[test]
    fn test_bool_shrinks_to_false() {
        let mut random = Random::from_seed(0);
        for _ in 0..20 {
            let tree = Gen::bool().generate(&mut random).unwrap();
            if *tree.value() {
                assert_eq!(tree.shrinks(10), vec![false]);
            } else {
                assert!(!tree.has_shrinks());
            }
        }
    }

    #[test]
    fn test_element_of_shrinks_toward_first() {
        let gen = Gen::element_of(vec!["a", "b", "c", "d"]);
        let mut random = Random::from_seed(13);
        for _ in 0..20 {
            let tree = gen.generate(&mut random).unwrap();
            if *tree.value() != "a" {
                assert_eq!(tree.children().head().map(|child| *child.value()), Some("a"));
            }
        }
    }

    #[test]
    fn test_vec_lengths_within_bounds() {
        let gen = Gen::vec_of(Gen::<u8>::interval(0, 9), 2, 6);
        let mut random = Random::from_seed(44);
        for _ in 0..50 {
            let tree = gen.generate(&mut random).unwrap();
            assert!((2..=6).contains(&tree.value().len()));
            assert!(tree.shrinks(200).iter().all(|v| (2..=6).contains(&v.len())));
        }
    }

    #[test]
    fn test_vec_shrinks_length_before_elements() {
        let tree = sequence_tree(
            Rc::new(vec![
                integral_tree(3, 0).map(|&v| v as u8),
                integral_tree(4, 0).map(|&v| v as u8),
            ]),
            0,
        );
        let kids: Vec<Vec<u8>> = tree.children().iter().map(|c| c.value().clone()).collect();
        assert_eq!(kids[0], Vec::<u8>::new());
        assert_eq!(kids[1], vec![3]);
        assert!(kids.contains(&vec![4]));
        assert!(kids.contains(&vec![0, 4]));
        assert!(kids.contains(&vec![3, 0]));
    }

    #[test]
    fn test_ascii_alpha_strings() {
        let gen = Gen::<String>::ascii_alpha(8);
        let mut random = Random::from_seed(101);
        for _ in 0..50 {
            let tree = gen.generate(&mut random).unwrap();
            assert!(tree.value().len() <= 8);
            assert!(tree.value().chars().all(|c| c.is_ascii_alphabetic()));
        }
    }
}
