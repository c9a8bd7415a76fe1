//! Lazy rose tree implementation for shrinking test values.

use crate::error::{Error, Result};
use crate::stream::Stream;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

pub mod render;

type Children<T> = Rc<dyn Fn() -> Stream<Tree<T>>>;
type Then<T> = Rc<dyn Fn(&Tree<T>) -> Stream<Tree<T>>>;

/// A rose tree containing a value and its lazily computed shrinks.
///
/// The value is fixed when the tree is built. The children are produced on
/// demand by a shared, deterministic function, so a tree can be walked any
/// number of times and subtrees can be aliased by several parents. Every
/// combinator returns a new tree and leaves the original untouched.
pub struct Tree<T> {
    value: T,
    children: Children<T>,
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Tree {
            value: self.value.clone(),
            children: self.children.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T> Tree<T> {
    /// The value at the root of this tree.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume the tree, keeping only its value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The simpler candidates for this value, most aggressive first.
    pub fn children(&self) -> Stream<Tree<T>> {
        (self.children)()
    }

    /// Check if the tree has any children (shrinks).
    pub fn has_shrinks(&self) -> bool {
        !self.children().is_empty()
    }
}

impl<T> Tree<T>
where
    T: Clone + 'static,
{
    /// Create a new tree with the given value and no children.
    pub fn singleton(value: T) -> Self {
        Tree {
            value,
            children: Rc::new(Stream::<Tree<T>>::empty),
        }
    }

    /// Create a new tree with the given value and a fixed list of children.
    pub fn with_children(value: T, children: Vec<Tree<T>>) -> Self {
        let children = Stream::from_vec(children);
        Tree {
            value,
            children: Rc::new(move || children.clone()),
        }
    }

    /// Replace the children producer, keeping the value.
    pub fn with<F>(self, children: F) -> Self
    where
        F: Fn() -> Stream<Tree<T>> + 'static,
    {
        Tree {
            value: self.value,
            children: Rc::new(children),
        }
    }

    /// Map a function over every value in the tree.
    pub fn map<U, F>(&self, f: F) -> Tree<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        self.map_rc(Rc::new(f))
    }

    fn map_rc<U>(&self, f: Rc<dyn Fn(&T) -> U>) -> Tree<U>
    where
        U: Clone + 'static,
    {
        let value = f(&self.value);
        let children = self.children.clone();
        Tree::singleton(value).with(move || {
            let f = f.clone();
            children().transform(move |child| child.map_rc(f.clone()))
        })
    }

    /// Replace every value with the tree `f` builds from it.
    ///
    /// The root takes the value of `f(value)`. Its children are the original
    /// children, each flat-mapped again, followed by the children of the tree
    /// `f` returned for the root.
    pub fn flat_map<U, F>(&self, f: F) -> Tree<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> Tree<U> + 'static,
    {
        self.flat_map_rc(Rc::new(f))
    }

    fn flat_map_rc<U>(&self, f: Rc<dyn Fn(&T) -> Tree<U>>) -> Tree<U>
    where
        U: Clone + 'static,
    {
        let inner = f(&self.value);
        let children = self.children.clone();
        let inner_children = inner.children.clone();
        Tree {
            value: inner.value,
            children: Rc::new(move || {
                let f = f.clone();
                let inner_children = inner_children.clone();
                children()
                    .transform(move |child| child.flat_map_rc(f.clone()))
                    .concat_with(move || inner_children())
            }),
        }
    }

    /// Restrict the tree to values satisfying `predicate`.
    ///
    /// Fails with [`Error::FilterRejected`] when the root itself is rejected.
    /// A rejected child is replaced by its own filtered children, descending
    /// at most `tolerance` levels before that branch is dropped.
    pub fn filter<F>(&self, predicate: F, tolerance: usize) -> Result<Tree<T>>
    where
        F: Fn(&T) -> bool + 'static,
    {
        if !predicate(&self.value) {
            return Err(Error::FilterRejected);
        }
        Ok(self.filter_accepted(Rc::new(predicate), tolerance))
    }

    fn filter_accepted(&self, predicate: Rc<dyn Fn(&T) -> bool>, tolerance: usize) -> Tree<T> {
        let children = self.children.clone();
        Tree {
            value: self.value.clone(),
            children: Rc::new(move || filter_children(children(), predicate.clone(), tolerance)),
        }
    }

    /// At every node, append the stream `then` computes for that node after
    /// the node's existing children.
    pub fn concat<F>(&self, then: F) -> Tree<T>
    where
        F: Fn(&Tree<T>) -> Stream<Tree<T>> + 'static,
    {
        self.concat_rc(Rc::new(then))
    }

    fn concat_rc(&self, then: Then<T>) -> Tree<T> {
        let original = self.clone();
        Tree {
            value: self.value.clone(),
            children: Rc::new(move || {
                let recurse = then.clone();
                let appended = then.clone();
                let node = original.clone();
                original
                    .children()
                    .transform(move |child| child.concat_rc(recurse.clone()))
                    .concat_with(move || appended(&node))
            }),
        }
    }

    /// At every leaf, use the stream `then` computes for that leaf as its
    /// children.
    pub fn and_then<F>(&self, then: F) -> Tree<T>
    where
        F: Fn(&Tree<T>) -> Stream<Tree<T>> + 'static,
    {
        self.and_then_rc(Rc::new(then))
    }

    fn and_then_rc(&self, then: Then<T>) -> Tree<T> {
        let original = self.clone();
        Tree {
            value: self.value.clone(),
            children: Rc::new(move || {
                let children = original.children();
                if children.is_empty() {
                    then(&original)
                } else {
                    let then = then.clone();
                    children.transform(move |child| child.and_then_rc(then.clone()))
                }
            }),
        }
    }

    /// Keep at most `n` children at every level.
    pub fn take(&self, n: usize) -> Tree<T> {
        let children = self.children.clone();
        Tree {
            value: self.value.clone(),
            children: Rc::new(move || children().take(n).transform(move |child| child.take(n))),
        }
    }

    /// Up to `limit` shrink values in breadth-first order.
    pub fn shrinks(&self, limit: usize) -> Vec<T> {
        let mut result = Vec::new();
        let mut queue: VecDeque<Tree<T>> = self.children().iter().take(limit).collect();

        while let Some(tree) = queue.pop_front() {
            if result.len() >= limit {
                break;
            }
            result.push(tree.value.clone());
            let remaining = limit.saturating_sub(result.len() + queue.len());
            queue.extend(tree.children().iter().take(remaining));
        }

        result
    }

    /// Values down to `max_depth` levels, root first, depth-first.
    ///
    /// Every level visited must have finitely many children.
    pub fn expand(&self, max_depth: usize) -> Vec<T> {
        let mut result = vec![self.value.clone()];
        self.expand_recursive(&mut result, max_depth);
        result
    }

    fn expand_recursive(&self, result: &mut Vec<T>, remaining: usize) {
        if remaining == 0 {
            return;
        }
        for child in self.children().iter() {
            result.push(child.value.clone());
            child.expand_recursive(result, remaining - 1);
        }
    }
}

fn filter_children<T>(
    children: Stream<Tree<T>>,
    predicate: Rc<dyn Fn(&T) -> bool>,
    tolerance: usize,
) -> Stream<Tree<T>>
where
    T: Clone + 'static,
{
    children.flat_transform(move |child| {
        if predicate(&child.value) {
            Stream::one(child.filter_accepted(predicate.clone(), tolerance))
        } else if tolerance > 0 {
            filter_children(child.children(), predicate.clone(), tolerance - 1)
        } else {
            Stream::empty()
        }
    })
}

impl<T: Clone + 'static> From<T> for Tree<T> {
    fn from(value: T) -> Self {
        Tree::singleton(value)
    }
}
