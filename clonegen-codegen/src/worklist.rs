//! Pending/done bookkeeping for one method family.

use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Insertion-ordered work queue with a done set.
///
/// A name is never pending and done at the same time, and once queued it
/// is never queued again. Popping advances a cursor over the queue.
#[derive(Debug, Default, Clone)]
pub struct Worklist {
    queue: IndexSet<String>,
    cursor: usize,
    done: HashSet<String>,
    requested_by: HashMap<String, String>,
}

impl Worklist {
    /// Creates an empty worklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a name. Returns false if it was already queued or done.
    pub fn push(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.done.contains(&name) {
            return false;
        }
        self.queue.insert(name)
    }

    /// Queues a name referenced from the body of `by`.
    ///
    /// The first referrer of a name is kept even if the name was already
    /// queued.
    pub fn require(&mut self, name: &str, by: &str) -> bool {
        if !self.done.contains(name) && !self.requested_by.contains_key(name) {
            self.requested_by.insert(name.to_string(), by.to_string());
        }
        self.push(name)
    }

    /// Returns the first body that referenced `name`.
    #[must_use]
    pub fn requester(&self, name: &str) -> Option<&str> {
        self.requested_by.get(name).map(String::as_str)
    }

    /// Removes and returns the oldest pending name.
    pub fn pop(&mut self) -> Option<String> {
        while let Some(name) = self.queue.get_index(self.cursor) {
            self.cursor += 1;
            if !self.done.contains(name) {
                return Some(name.clone());
            }
        }
        None
    }

    /// Marks a name done, dropping it from the pending queue.
    ///
    /// Returns false if it was already done.
    pub fn mark_done(&mut self, name: &str) -> bool {
        if self.done.contains(name) {
            return false;
        }
        self.done.insert(name.to_string())
    }

    /// Returns true if the name is done.
    #[must_use]
    pub fn is_done(&self, name: &str) -> bool {
        self.done.contains(name)
    }

    /// Returns true if the name is pending.
    #[must_use]
    pub fn is_pending(&self, name: &str) -> bool {
        self.queue
            .get_index_of(name)
            .is_some_and(|i| i >= self.cursor && !self.done.contains(name))
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending_iter().next().is_none()
    }

    /// Returns the number of pending names.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending_iter().count()
    }

    /// Returns the pending names in queue order.
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.pending_iter().cloned().collect()
    }

    /// Returns the done set.
    #[must_use]
    pub fn done(&self) -> &HashSet<String> {
        &self.done
    }

    fn pending_iter(&self) -> impl Iterator<Item = &String> {
        self.queue
            .iter()
            .skip(self.cursor)
            .filter(|name| !self.done.contains(*name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut work = Worklist::new();
        assert!(work.push("B"));
        assert!(work.push("A"));
        assert!(work.push("C"));
        assert_eq!(work.pop().as_deref(), Some("B"));
        assert_eq!(work.pop().as_deref(), Some("A"));
        assert_eq!(work.pop().as_deref(), Some("C"));
        assert!(work.pop().is_none());
    }

    #[test]
    fn test_push_is_deduplicated() {
        let mut work = Worklist::new();
        assert!(work.push("A"));
        assert!(!work.push("A"));
        assert_eq!(work.pending_len(), 1);
    }

    #[test]
    fn test_popped_name_is_not_requeued() {
        let mut work = Worklist::new();
        work.push("S");
        assert_eq!(work.pop().as_deref(), Some("S"));
        assert!(!work.push("S"));
        assert!(work.is_empty());
    }

    #[test]
    fn test_done_never_pending() {
        let mut work = Worklist::new();
        work.push("A");
        assert!(work.mark_done("A"));
        assert!(!work.is_pending("A"));
        assert!(work.is_done("A"));
        assert!(!work.push("A"));
        assert!(work.is_empty());
        assert!(work.pop().is_none());
        assert!(!work.mark_done("A"));
    }

    #[test]
    fn test_done_names_are_skipped_by_pop() {
        let mut work = Worklist::new();
        work.push("A");
        work.push("B");
        work.mark_done("A");
        assert_eq!(work.pending(), ["B"]);
        assert_eq!(work.pop().as_deref(), Some("B"));
    }

    #[test]
    fn test_first_requester_is_kept() {
        let mut work = Worklist::new();
        assert!(work.push("Inner"));
        assert!(!work.require("Inner", "Outer"));
        assert!(!work.require("Inner", "Other"));
        assert_eq!(work.requester("Inner"), Some("Outer"));
        assert_eq!(work.requester("Outer"), None);
    }
}
