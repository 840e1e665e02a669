use chrono::{DateTime, Utc};

use marginalia_core::domain::comment::{Author, Comment, CommentPage};
use marginalia_core::types::post_id::PostId;

/// In-memory comment collection, newest first per post.
#[derive(Debug, Default)]
pub struct CommentStore {
    next_id: i64,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    post: i64,
    comment: Comment,
}

impl CommentStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub fn create(
        &mut self,
        post: PostId,
        author: Author,
        content: &str,
        published_at: DateTime<Utc>,
    ) -> Comment {
        let id = self.next_id;
        self.next_id += 1;
        let comment = Comment {
            id,
            url: format!("/api/comments/{id}"),
            author,
            content: content.to_string(),
            published_at,
        };
        self.entries.insert(
            0,
            Entry {
                post: post.as_i64(),
                comment: comment.clone(),
            },
        );
        comment
    }

    pub fn page(&self, post: PostId, page: u32, page_size: usize) -> CommentPage {
        let matching: Vec<&Comment> = self
            .entries
            .iter()
            .filter(|entry| entry.post == post.as_i64())
            .map(|entry| &entry.comment)
            .collect();
        let total = matching.len();
        let offset = (page.saturating_sub(1) as usize).saturating_mul(page_size);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect();
        CommentPage { items, total }
    }

    pub fn get(&self, id: i64) -> Option<&Comment> {
        self.entries
            .iter()
            .find(|entry| entry.comment.id == id)
            .map(|entry| &entry.comment)
    }

    pub fn update(&mut self, id: i64, content: &str) -> Option<Comment> {
        let entry = self.entries.iter_mut().find(|entry| entry.comment.id == id)?;
        entry.comment.content = content.to_string();
        Some(entry.comment.clone())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.comment.id != id);
        self.entries.len() != before
    }

    pub fn seed(&mut self, post: PostId, count: usize, now: DateTime<Utc>) {
        let authors = [
            Author {
                id: 1,
                username: "user-1".to_string(),
            },
            Author {
                id: 2,
                username: "user-2".to_string(),
            },
        ];
        for index in 0..count {
            let author = authors[index % authors.len()].clone();
            let content = format!("seed comment number {}", index + 1);
            self.create(post, author, &content, now);
        }
    }
}
