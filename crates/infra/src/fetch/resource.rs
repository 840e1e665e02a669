use marginalia_core::domain::comment::Comment;
use marginalia_core::domain::form::FieldErrors;
use marginalia_core::types::post_id::PostId;

use crate::api::{ApiClient, ApiError, SaveResult};

/// One-at-a-time submitter for comment mutations. Holds the field-keyed
/// errors from the last rejected submission; transport and server failures
/// propagate to the caller untouched.
#[derive(Debug)]
pub struct ResourceFetcher {
    client: ApiClient,
    loading: bool,
    errors: FieldErrors,
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved(Comment),
    Rejected,
    Ignored,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Ignored,
}

impl ResourceFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            loading: false,
            errors: FieldErrors::new(),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn clear_error(&mut self, field: &str) -> bool {
        self.errors.clear(field)
    }

    pub async fn create(&mut self, post: PostId, content: &str) -> Result<SaveOutcome, ApiError> {
        if self.loading {
            return Ok(SaveOutcome::Ignored);
        }
        self.loading = true;
        let result = self.client.create_comment(post, content).await;
        self.loading = false;
        self.settle(result?)
    }

    pub async fn update(&mut self, url: &str, content: &str) -> Result<SaveOutcome, ApiError> {
        if self.loading {
            return Ok(SaveOutcome::Ignored);
        }
        self.loading = true;
        let result = self.client.update_comment(url, content).await;
        self.loading = false;
        self.settle(result?)
    }

    pub async fn delete(&mut self, url: &str) -> Result<DeleteOutcome, ApiError> {
        if self.loading {
            return Ok(DeleteOutcome::Ignored);
        }
        self.loading = true;
        let result = self.client.delete_comment(url).await;
        self.loading = false;
        result?;
        self.errors = FieldErrors::new();
        Ok(DeleteOutcome::Deleted)
    }

    fn settle(&mut self, result: SaveResult) -> Result<SaveOutcome, ApiError> {
        match result {
            SaveResult::Saved(comment) => {
                self.errors = FieldErrors::new();
                Ok(SaveOutcome::Saved(comment))
            }
            SaveResult::Invalid(errors) => {
                self.errors = errors;
                Ok(SaveOutcome::Rejected)
            }
        }
    }
}
