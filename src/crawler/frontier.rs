//! Crawl history and the work queue
//!
//! The queue is a stack: the most recently discovered URL is fetched next,
//! which makes the traversal depth-first.

use crate::url::CanonicalUrl;
use std::collections::HashSet;

/// URLs fetched during the current run
///
/// Holds both the requested and the post-redirect identity of every page.
#[derive(Debug, Default)]
pub struct History {
    visited: HashSet<CanonicalUrl>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL; returns false if it was already present
    pub fn insert(&mut self, url: CanonicalUrl) -> bool {
        self.visited.insert(url)
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalUrl> {
        self.visited.iter()
    }
}

/// LIFO queue of URLs waiting to be fetched, without duplicates
#[derive(Debug, Default)]
pub struct WorkQueue {
    stack: Vec<CanonicalUrl>,
    members: HashSet<CanonicalUrl>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a URL on top; returns false (and does nothing) if it is already queued
    pub fn push(&mut self, url: CanonicalUrl) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.stack.push(url);
        true
    }

    /// Removes and returns the most recently pushed URL
    pub fn pop(&mut self) -> Option<CanonicalUrl> {
        let url = self.stack.pop()?;
        self.members.remove(&url);
        Some(url)
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.members.contains(url)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Iterates from the bottom of the stack (next to be popped last)
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalUrl> {
        self.stack.iter()
    }
}
