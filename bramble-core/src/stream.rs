//! Persistent lazy streams.
//!
//! A [`Stream`] is an immutable singly linked list whose head is computed
//! eagerly and whose tail is a deferred computation. Tails are memoized on
//! first use, so cloning and re-walking a stream never repeats work and
//! always sees the same elements. Streams may be infinite.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

type TailFn<T> = Rc<dyn Fn() -> Stream<T>>;

struct Cell<T> {
    head: T,
    tail: Thunk<T>,
}

struct Thunk<T> {
    compute: TailFn<T>,
    forced: OnceCell<Stream<T>>,
}

impl<T> Thunk<T> {
    fn force(&self) -> Stream<T> {
        self.forced.get_or_init(|| (self.compute)()).clone()
    }
}

/// A lazy, possibly infinite sequence with structural sharing.
pub struct Stream<T> {
    cell: Option<Rc<Cell<T>>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Drop for Stream<T> {
    // Forced tails form a chain as long as the stream has been walked, so
    // uniquely owned cells are unlinked one at a time instead of recursively.
    fn drop(&mut self) {
        let mut next = self.cell.take();
        while let Some(shared) = next {
            next = match Rc::try_unwrap(shared) {
                Ok(mut cell) => {
                    cell.tail.forced.take().and_then(|mut tail| tail.cell.take())
                }
                Err(_) => None,
            };
        }
    }
}

impl<T> Default for Stream<T> {
    fn default() -> Self {
        Stream::empty()
    }
}

impl<T> Stream<T> {
    /// The empty stream.
    pub fn empty() -> Self {
        Stream { cell: None }
    }

    /// A stream with the given head and a deferred tail.
    pub fn cons<F>(head: T, tail: F) -> Self
    where
        F: Fn() -> Stream<T> + 'static,
    {
        Stream {
            cell: Some(Rc::new(Cell {
                head,
                tail: Thunk {
                    compute: Rc::new(tail),
                    forced: OnceCell::new(),
                },
            })),
        }
    }

    /// A stream holding exactly one element.
    pub fn one(value: T) -> Self
    where
        T: 'static,
    {
        Stream::cons(value, Stream::empty)
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_none()
    }

    pub fn head(&self) -> Option<&T> {
        self.cell.as_ref().map(|cell| &cell.head)
    }

    /// The rest of the stream. The tail of the empty stream is empty.
    pub fn tail(&self) -> Stream<T> {
        match &self.cell {
            Some(cell) => cell.tail.force(),
            None => Stream::empty(),
        }
    }

    /// Iterate over clones of the elements, forcing tails as needed.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            current: self.clone(),
        }
    }
}

impl<T> Stream<T>
where
    T: Clone + 'static,
{
    /// A finite stream over the elements of a vector.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_shared(Rc::new(values), 0)
    }

    fn from_shared(values: Rc<Vec<T>>, index: usize) -> Self {
        match values.get(index) {
            Some(head) => {
                let head = head.clone();
                Stream::cons(head, move || Self::from_shared(values.clone(), index + 1))
            }
            None => Stream::empty(),
        }
    }

    /// Build a stream by repeatedly stepping a seed until `step` returns `None`.
    pub fn unfold<S, F>(seed: S, step: F) -> Self
    where
        S: Clone + 'static,
        F: Fn(&S) -> Option<(T, S)> + 'static,
    {
        Self::unfold_rc(seed, Rc::new(step))
    }

    fn unfold_rc<S>(seed: S, step: Rc<dyn Fn(&S) -> Option<(T, S)>>) -> Self
    where
        S: Clone + 'static,
    {
        match step(&seed) {
            Some((head, next)) => {
                Stream::cons(head, move || Self::unfold_rc(next.clone(), step.clone()))
            }
            None => Stream::empty(),
        }
    }

    /// Lazily apply `f` to every element.
    pub fn transform<U, F>(&self, f: F) -> Stream<U>
    where
        U: 'static,
        F: Fn(&T) -> U + 'static,
    {
        self.transform_rc(Rc::new(f))
    }

    fn transform_rc<U: 'static>(&self, f: Rc<dyn Fn(&T) -> U>) -> Stream<U> {
        match &self.cell {
            Some(cell) => {
                let head = f(&cell.head);
                let cell = cell.clone();
                Stream::cons(head, move || cell.tail.force().transform_rc(f.clone()))
            }
            None => Stream::empty(),
        }
    }

    /// Keep only the elements satisfying `predicate`.
    ///
    /// Finding the first match forces as many tails as needed; on an infinite
    /// stream with no match this does not return.
    pub fn filter<F>(&self, predicate: F) -> Stream<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter_rc(Rc::new(predicate))
    }

    fn filter_rc(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Stream<T> {
        let mut current = self.clone();
        while let Some(cell) = current.cell.clone() {
            if predicate(&cell.head) {
                let head = cell.head.clone();
                return Stream::cons(head, move || {
                    cell.tail.force().filter_rc(predicate.clone())
                });
            }
            current = cell.tail.force();
        }
        Stream::empty()
    }

    /// Append `other` once this stream is exhausted.
    pub fn concat(&self, other: &Stream<T>) -> Stream<T> {
        let other = other.clone();
        self.concat_with(move || other.clone())
    }

    /// Append a stream computed only once this stream is exhausted.
    pub fn concat_with<F>(&self, other: F) -> Stream<T>
    where
        F: Fn() -> Stream<T> + 'static,
    {
        self.concat_rc(Rc::new(other))
    }

    fn concat_rc(&self, other: TailFn<T>) -> Stream<T> {
        match &self.cell {
            Some(cell) => {
                let head = cell.head.clone();
                let cell = cell.clone();
                Stream::cons(head, move || cell.tail.force().concat_rc(other.clone()))
            }
            None => other(),
        }
    }

    /// Lazily concatenate the streams produced by `f` for each element.
    pub fn flat_transform<U, F>(&self, f: F) -> Stream<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Stream<U> + 'static,
    {
        self.flat_transform_rc(Rc::new(f))
    }

    fn flat_transform_rc<U>(&self, f: Rc<dyn Fn(&T) -> Stream<U>>) -> Stream<U>
    where
        U: Clone + 'static,
    {
        let mut current = self.clone();
        while let Some(cell) = current.cell.clone() {
            let produced = f(&cell.head);
            if !produced.is_empty() {
                return produced.concat_with(move || cell.tail.force().flat_transform_rc(f.clone()));
            }
            current = cell.tail.force();
        }
        Stream::empty()
    }

    /// At most the first `n` elements.
    pub fn take(&self, n: usize) -> Stream<T> {
        match &self.cell {
            Some(cell) if n > 0 => {
                let head = cell.head.clone();
                let cell = cell.clone();
                Stream::cons(head, move || cell.tail.force().take(n - 1))
            }
            _ => Stream::empty(),
        }
    }

    /// Collect at most `limit` elements.
    pub fn to_vec(&self, limit: usize) -> Vec<T> {
        self.iter().take(limit).collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the head is shown; the tail may be infinite or unforced.
        match self.head() {
            Some(head) => write!(f, "Stream({head:?}, ..)"),
            None => write!(f, "Stream()"),
        }
    }
}

/// Iterator over a [`Stream`], yielding clones of its elements.
pub struct Iter<T> {
    current: Stream<T>,
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let cell = self.current.cell.clone()?;
        self.current = cell.tail.force();
        Some(cell.head.clone())
    }
}
