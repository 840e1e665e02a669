use std::collections::HashMap;

use tracing::info;

use marginalia_core::domain::authz::{self, Actor, CommentVoter, Subject};
use marginalia_core::domain::feed::CommentFeed;
use marginalia_core::domain::form::CommentForm;
use marginalia_core::domain::item::{ItemMode, ItemState};
use marginalia_core::types::post_id::PostId;
use marginalia_infra::api::{ApiClient, ApiError};
use marginalia_infra::fetch::paginated::PaginatedFetcher;
use marginalia_infra::fetch::resource::{DeleteOutcome, ResourceFetcher, SaveOutcome};

/// Result of one widget operation, for the host to report. Transport and
/// server failures are returned as errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Done,
    Rejected,
    NotPermitted,
    Unavailable,
    Ignored,
}

/// Controller for one post's comment widget. Owns the feed (via the
/// paginated fetcher), the create form, and the per-item view/edit states;
/// the feed is only ever mutated through prepend/remove/replace plus page
/// merges.
pub struct CommentsController {
    viewer: Option<i64>,
    pages: PaginatedFetcher,
    submit: ResourceFetcher,
    remover: ResourceFetcher,
    form: Option<CommentForm>,
    items: HashMap<i64, ItemState>,
}

impl CommentsController {
    pub fn new(client: ApiClient, post: PostId, viewer: Option<i64>) -> Self {
        Self {
            viewer,
            pages: PaginatedFetcher::new(client.clone(), post),
            submit: ResourceFetcher::new(client.clone()),
            remover: ResourceFetcher::new(client),
            // Unauthenticated viewers get no comment form at all.
            form: viewer.map(|_| CommentForm::new()),
            items: HashMap::new(),
        }
    }

    pub async fn activate(&mut self) -> Result<(), ApiError> {
        self.pages.load().await?;
        info!(
            post = %self.pages.post(),
            total = self.pages.feed().total(),
            "initial comments loaded"
        );
        Ok(())
    }

    pub async fn load_more(&mut self) -> Result<bool, ApiError> {
        self.pages.load().await
    }

    pub fn feed(&self) -> &CommentFeed {
        self.pages.feed()
    }

    pub fn form(&self) -> Option<&CommentForm> {
        self.form.as_ref()
    }

    pub fn set_draft(&mut self, value: &str) -> bool {
        match self.form.as_mut() {
            Some(form) => {
                form.set_draft(value);
                true
            }
            None => false,
        }
    }

    pub fn item_mode(&self, id: i64) -> ItemMode {
        self.items.get(&id).map(ItemState::mode).unwrap_or_default()
    }

    pub fn edit_form(&self, id: i64) -> Option<&CommentForm> {
        self.items.get(&id).and_then(ItemState::form)
    }

    pub fn set_edit_draft(&mut self, id: i64, value: &str) -> bool {
        match self.items.get_mut(&id).and_then(ItemState::form_mut) {
            Some(form) => {
                form.set_draft(value);
                true
            }
            None => false,
        }
    }

    /// Display gate for the edit/delete controls; runs the same voter the
    /// server runs, so the two rules cannot drift apart.
    pub fn can_edit(&self, id: i64) -> bool {
        let Some(comment) = self.pages.feed().get(id) else {
            return false;
        };
        let actor = match self.viewer {
            Some(user) => Actor::user(user),
            None => Actor::anonymous(),
        };
        let voter = CommentVoter;
        authz::is_granted(
            &[&voter],
            &actor,
            authz::EDIT_COMMENT,
            &Subject::Comment(comment),
        )
    }

    pub fn begin_edit(&mut self, id: i64) -> OpOutcome {
        let Some(content) = self
            .pages
            .feed()
            .get(id)
            .map(|comment| comment.content.clone())
        else {
            return OpOutcome::Unavailable;
        };
        if !self.can_edit(id) {
            return OpOutcome::NotPermitted;
        }
        self.items.entry(id).or_default().begin_edit(&content);
        OpOutcome::Done
    }

    pub fn cancel_edit(&mut self, id: i64) -> OpOutcome {
        match self.items.get_mut(&id) {
            Some(item) if item.is_editing() => {
                item.cancel();
                OpOutcome::Done
            }
            _ => OpOutcome::Unavailable,
        }
    }

    pub async fn submit_new(&mut self) -> Result<OpOutcome, ApiError> {
        let Some(form) = self.form.as_mut() else {
            return Ok(OpOutcome::Unavailable);
        };
        // Client-side validation; nothing is sent when it fails.
        if !form.validate() {
            return Ok(OpOutcome::Rejected);
        }
        let draft = form.draft().to_string();
        if self.submit.loading() {
            return Ok(OpOutcome::Ignored);
        }
        let post = self.pages.post();
        match self.submit.create(post, &draft).await? {
            SaveOutcome::Saved(comment) => {
                info!(comment = comment.id, "comment created");
                self.pages.feed_mut().prepend(comment);
                if let Some(form) = self.form.as_mut() {
                    form.clear();
                }
                Ok(OpOutcome::Done)
            }
            SaveOutcome::Rejected => {
                let errors = self.submit.errors().clone();
                if let Some(form) = self.form.as_mut() {
                    form.absorb(errors);
                }
                Ok(OpOutcome::Rejected)
            }
            SaveOutcome::Ignored => Ok(OpOutcome::Ignored),
        }
    }

    pub async fn submit_edit(&mut self, id: i64) -> Result<OpOutcome, ApiError> {
        let Some(url) = self
            .pages
            .feed()
            .get(id)
            .map(|comment| comment.url.clone())
        else {
            return Ok(OpOutcome::Unavailable);
        };
        if !self.can_edit(id) {
            return Ok(OpOutcome::NotPermitted);
        }
        let draft = match self.items.get_mut(&id).and_then(ItemState::form_mut) {
            Some(form) => {
                if !form.validate() {
                    return Ok(OpOutcome::Rejected);
                }
                form.draft().to_string()
            }
            None => return Ok(OpOutcome::Unavailable),
        };
        if self.submit.loading() {
            return Ok(OpOutcome::Ignored);
        }
        match self.submit.update(&url, &draft).await? {
            SaveOutcome::Saved(updated) => {
                info!(comment = updated.id, "comment updated");
                self.pages.feed_mut().replace(updated);
                if let Some(item) = self.items.get_mut(&id) {
                    item.finish();
                }
                Ok(OpOutcome::Done)
            }
            SaveOutcome::Rejected => {
                let errors = self.submit.errors().clone();
                if let Some(form) = self.items.get_mut(&id).and_then(ItemState::form_mut) {
                    form.absorb(errors);
                }
                Ok(OpOutcome::Rejected)
            }
            SaveOutcome::Ignored => Ok(OpOutcome::Ignored),
        }
    }

    pub async fn delete(&mut self, id: i64) -> Result<OpOutcome, ApiError> {
        let Some(url) = self
            .pages
            .feed()
            .get(id)
            .map(|comment| comment.url.clone())
        else {
            return Ok(OpOutcome::Unavailable);
        };
        if !self.can_edit(id) {
            return Ok(OpOutcome::NotPermitted);
        }
        match self.remover.delete(&url).await? {
            DeleteOutcome::Deleted => {
                info!(comment = id, "comment deleted");
                self.pages.feed_mut().remove(id);
                self.items.remove(&id);
                Ok(OpOutcome::Done)
            }
            DeleteOutcome::Ignored => Ok(OpOutcome::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{CommentsController, OpOutcome};
    use crate::testsupport::spawn_fixture;
    use marginalia_core::domain::comment::Author;
    use marginalia_core::domain::form::CONTENT_FIELD;
    use marginalia_core::domain::item::ItemMode;
    use marginalia_core::types::post_id::PostId;
    use marginalia_infra::api::{ApiClient, ApiError, SaveResult};

    fn post() -> PostId {
        PostId::try_from(42).unwrap()
    }

    fn author(id: i64) -> Author {
        Author {
            id,
            username: format!("user-{id}"),
        }
    }

    fn feed_ids(controller: &CommentsController) -> Vec<i64> {
        controller
            .feed()
            .comments()
            .iter()
            .map(|comment| comment.id)
            .collect()
    }

    #[tokio::test]
    async fn pagination_accumulates_all_pages_without_duplicates() {
        let fixture = spawn_fixture(2).await;
        {
            let mut store = fixture.state.store.write().await;
            store.seed(post(), 5, Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url);
        let mut controller = CommentsController::new(client, post(), None);
        controller.activate().await.unwrap();
        assert_eq!(controller.feed().len(), 2);
        assert!(controller.feed().has_more());

        while controller.feed().has_more() {
            assert!(controller.load_more().await.unwrap());
        }
        assert_eq!(feed_ids(&controller), vec![5, 4, 3, 2, 1]);
        assert_eq!(controller.feed().total(), 5);
        // Exhausted: further calls are no-ops.
        assert!(!controller.load_more().await.unwrap());
    }

    #[tokio::test]
    async fn create_prepends_once_and_clears_form() {
        let fixture = spawn_fixture(10).await;
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(7));
        let mut controller = CommentsController::new(client, post(), Some(7));
        controller.activate().await.unwrap();

        assert!(controller.set_draft("a fine comment"));
        assert_eq!(controller.submit_new().await.unwrap(), OpOutcome::Done);
        assert_eq!(controller.feed().len(), 1);
        assert_eq!(controller.feed().total(), 1);
        let head = &controller.feed().comments()[0];
        assert_eq!(head.author.id, 7);
        assert_eq!(head.content, "a fine comment");
        assert_eq!(controller.form().unwrap().draft(), "");
    }

    #[tokio::test]
    async fn short_draft_is_rejected_before_any_request() {
        let fixture = spawn_fixture(10).await;
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(7));
        let mut controller = CommentsController::new(client, post(), Some(7));
        controller.activate().await.unwrap();

        controller.set_draft("hey");
        assert_eq!(controller.submit_new().await.unwrap(), OpOutcome::Rejected);
        assert!(
            controller
                .form()
                .unwrap()
                .errors()
                .get(CONTENT_FIELD)
                .is_some()
        );
        // Nothing reached the server.
        let store = fixture.state.store.read().await;
        assert_eq!(store.page(post(), 1, 10).total, 0);
    }

    #[tokio::test]
    async fn unauthenticated_viewer_gets_no_form_or_controls() {
        let fixture = spawn_fixture(10).await;
        {
            let mut store = fixture.state.store.write().await;
            store.create(post(), author(1), "hello everyone", Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url);
        let mut controller = CommentsController::new(client, post(), None);
        controller.activate().await.unwrap();

        assert!(controller.form().is_none());
        assert!(!controller.set_draft("anything at all"));
        assert_eq!(controller.submit_new().await.unwrap(), OpOutcome::Unavailable);
        assert!(!controller.can_edit(1));
        assert_eq!(controller.begin_edit(1), OpOutcome::NotPermitted);
    }

    #[tokio::test]
    async fn edit_flow_replaces_comment_in_place() {
        let fixture = spawn_fixture(10).await;
        {
            let mut store = fixture.state.store.write().await;
            store.create(post(), author(1), "oldest comment", Utc::now());
            store.create(post(), author(1), "middle comment", Utc::now());
            store.create(post(), author(1), "newest comment", Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(1));
        let mut controller = CommentsController::new(client, post(), Some(1));
        controller.activate().await.unwrap();
        assert_eq!(feed_ids(&controller), vec![3, 2, 1]);

        assert_eq!(controller.begin_edit(2), OpOutcome::Done);
        assert_eq!(controller.item_mode(2), ItemMode::Edit);
        assert_eq!(controller.edit_form(2).unwrap().draft(), "middle comment");

        assert!(controller.set_edit_draft(2, "middle, but better"));
        assert_eq!(controller.submit_edit(2).await.unwrap(), OpOutcome::Done);
        assert_eq!(feed_ids(&controller), vec![3, 2, 1]);
        assert_eq!(controller.feed().get(2).unwrap().content, "middle, but better");
        assert_eq!(controller.item_mode(2), ItemMode::View);

        let store = fixture.state.store.read().await;
        assert_eq!(store.get(2).unwrap().content, "middle, but better");
    }

    #[tokio::test]
    async fn cancel_discards_draft_without_persisting() {
        let fixture = spawn_fixture(10).await;
        {
            let mut store = fixture.state.store.write().await;
            store.create(post(), author(1), "hello everyone", Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(1));
        let mut controller = CommentsController::new(client, post(), Some(1));
        controller.activate().await.unwrap();

        controller.begin_edit(1);
        controller.set_edit_draft(1, "half-typed edit");
        assert_eq!(controller.cancel_edit(1), OpOutcome::Done);
        assert_eq!(controller.item_mode(1), ItemMode::View);
        assert_eq!(controller.feed().get(1).unwrap().content, "hello everyone");
        assert_eq!(controller.cancel_edit(1), OpOutcome::Unavailable);
    }

    #[tokio::test]
    async fn delete_removes_comment_everywhere() {
        let fixture = spawn_fixture(10).await;
        {
            let mut store = fixture.state.store.write().await;
            store.create(post(), author(1), "oldest comment", Utc::now());
            store.create(post(), author(1), "newest comment", Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(1));
        let mut controller = CommentsController::new(client, post(), Some(1));
        controller.activate().await.unwrap();

        assert_eq!(controller.delete(2).await.unwrap(), OpOutcome::Done);
        assert_eq!(feed_ids(&controller), vec![1]);
        assert_eq!(controller.feed().total(), 1);
        assert_eq!(controller.delete(2).await.unwrap(), OpOutcome::Unavailable);

        let store = fixture.state.store.read().await;
        assert!(store.get(2).is_none());
    }

    #[tokio::test]
    async fn non_author_is_blocked_client_side_and_server_side() {
        let fixture = spawn_fixture(10).await;
        {
            let mut store = fixture.state.store.write().await;
            store.create(post(), author(1), "hello everyone", Utc::now());
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(2));
        let mut controller = CommentsController::new(client.clone(), post(), Some(2));
        controller.activate().await.unwrap();

        assert!(!controller.can_edit(1));
        assert_eq!(controller.begin_edit(1), OpOutcome::NotPermitted);
        assert_eq!(controller.delete(1).await.unwrap(), OpOutcome::NotPermitted);

        // The authoritative check: going straight to the API as the wrong
        // user is refused by the server's voter chain.
        let result = client.update_comment("/api/comments/1", "hijacked!").await;
        match result {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected 403, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_validation_errors_are_field_keyed() {
        let fixture = spawn_fixture(10).await;
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(7));
        // Bypasses the client-side form check to exercise the API contract.
        let result = client.create_comment(post(), "hi").await.unwrap();
        match result {
            SaveResult::Invalid(errors) => {
                assert!(errors.get(CONTENT_FIELD).is_some());
            }
            SaveResult::Saved(comment) => panic!("short content was accepted: {comment:?}"),
        }
    }
}
