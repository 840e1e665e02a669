use std::collections::BTreeMap;

use serde::Serialize;

pub const CONTENT_FIELD: &str = "content";
pub const MIN_CONTENT_CHARS: usize = 5;

/// Field name to message map returned by validation, matching the shape of
/// the API's violation payload. Cleared per field when the user edits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn clear(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

pub fn validate_content(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("content is required");
    }
    if value.chars().count() < MIN_CONTENT_CHARS {
        return Some("content must be at least 5 characters");
    }
    None
}

/// Draft plus errors for one comment form. The same type backs the create
/// form and the per-item edit forms; edit forms start pre-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    draft: String,
    errors: FieldErrors,
}

impl CommentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefilled(content: &str) -> Self {
        Self {
            draft: content.to_string(),
            errors: FieldErrors::new(),
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, value: &str) {
        self.draft = value.to_string();
        self.errors.clear(CONTENT_FIELD);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn clear_error(&mut self, field: &str) -> bool {
        self.errors.clear(field)
    }

    pub fn absorb(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// Client-side validation; a failed check records the error and blocks
    /// submission before any request is built.
    pub fn validate(&mut self) -> bool {
        match validate_content(&self.draft) {
            Some(message) => {
                self.errors.insert(CONTENT_FIELD, message);
                false
            }
            None => {
                self.errors.clear(CONTENT_FIELD);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.draft.clear();
        self.errors = FieldErrors::new();
    }
}
