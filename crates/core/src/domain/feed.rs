use std::collections::HashSet;

use super::comment::{Comment, CommentPage};

/// Authoritative ordered comment list for one post, keyed by comment id.
/// Order is the server-returned order; local mutations never reorder
/// surviving entries.
#[derive(Debug, Clone, Default)]
pub struct CommentFeed {
    comments: Vec<Comment>,
    total: usize,
    primed: bool,
}

impl CommentFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn get(&self, id: i64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// True until the first page arrives, then tracks whether the server
    /// holds more comments than have been fetched.
    pub fn has_more(&self) -> bool {
        !self.primed || self.comments.len() < self.total
    }

    pub fn merge_page(&mut self, page: CommentPage) {
        self.primed = true;
        self.total = page.total;
        let mut seen: HashSet<i64> = self.comments.iter().map(|comment| comment.id).collect();
        for comment in page.items {
            if seen.insert(comment.id) {
                self.comments.push(comment);
            }
        }
    }

    pub fn prepend(&mut self, comment: Comment) -> bool {
        if self.comments.iter().any(|existing| existing.id == comment.id) {
            return false;
        }
        self.comments.insert(0, comment);
        self.total += 1;
        true
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.comments.len();
        self.comments.retain(|comment| comment.id != id);
        if self.comments.len() == before {
            return false;
        }
        self.total = self.total.saturating_sub(1);
        true
    }

    pub fn replace(&mut self, comment: Comment) -> bool {
        match self
            .comments
            .iter_mut()
            .find(|existing| existing.id == comment.id)
        {
            Some(slot) => {
                *slot = comment;
                true
            }
            None => false,
        }
    }
}
