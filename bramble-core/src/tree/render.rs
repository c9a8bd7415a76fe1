//! Tree rendering for debugging shrink behaviour.
//!
//! Trees are lazy and may be deep, so every renderer takes an explicit bound.

use super::Tree;
use std::fmt::Display;

impl<T> Tree<T>
where
    T: Display + Clone + 'static,
{
    /// Render the tree structure down to `max_depth` levels below the root.
    pub fn render(&self, max_depth: usize) -> String {
        let mut result = String::new();
        self.render_recursive(&mut result, "", true, max_depth);
        result
    }

    fn render_recursive(&self, result: &mut String, prefix: &str, is_last: bool, depth: usize) {
        result.push_str(prefix);
        result.push_str(if is_last { "└── " } else { "├── " });
        result.push_str(&format!("{}\n", self.value));

        if depth == 0 {
            return;
        }

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        let children: Vec<Tree<T>> = self.children().iter().collect();
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            child.render_recursive(result, &child_prefix, child_is_last, depth - 1);
        }
    }

    /// Render the tree compactly as `value[child, child]`.
    pub fn render_compact(&self, max_depth: usize) -> String {
        let children = self.children();
        if max_depth == 0 || children.is_empty() {
            format!("{}", self.value)
        } else {
            let children_str: Vec<String> = children
                .iter()
                .map(|child| child.render_compact(max_depth - 1))
                .collect();
            format!("{}[{}]", self.value, children_str.join(", "))
        }
    }

    /// Render up to `limit` shrinks in breadth-first order.
    pub fn render_shrinks(&self, limit: usize) -> String {
        let shrinks = self.shrinks(limit);
        if shrinks.is_empty() {
            format!("{} (no shrinks)", self.value)
        } else {
            let shrink_strs: Vec<String> = shrinks.iter().map(|v| format!("{v}")).collect();
            format!("{} → [{}]", self.value, shrink_strs.join(", "))
        }
    }
}
