use marginalia_core::domain::feed::CommentFeed;
use marginalia_core::types::post_id::PostId;

use crate::api::{ApiClient, ApiError};

/// Page-by-page loader for one post's comments. Owns the authoritative
/// feed; `load` appends the next page, deduplicating by id. Re-entrant
/// triggers while a load is in flight are ignored rather than queued, so a
/// page can never be appended twice.
#[derive(Debug)]
pub struct PaginatedFetcher {
    client: ApiClient,
    post: PostId,
    next_page: u32,
    loading: bool,
    feed: CommentFeed,
}

impl PaginatedFetcher {
    pub fn new(client: ApiClient, post: PostId) -> Self {
        Self {
            client,
            post,
            next_page: 1,
            loading: false,
            feed: CommentFeed::new(),
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn feed(&self) -> &CommentFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut CommentFeed {
        &mut self.feed
    }

    /// Fetches and merges the next page. Returns false when the call was a
    /// no-op (load in flight, or no more pages). On error the cursor stays
    /// put: a retry refetches the same page and deduplication absorbs any
    /// overlap.
    pub async fn load(&mut self) -> Result<bool, ApiError> {
        if self.loading || !self.feed.has_more() {
            return Ok(false);
        }
        self.loading = true;
        let result = self.client.list_comments(self.post, self.next_page).await;
        self.loading = false;
        let page = result?;
        self.feed.merge_page(page);
        self.next_page += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::PaginatedFetcher;
    use crate::api::ApiClient;
    use marginalia_core::domain::comment::CommentPage;
    use marginalia_core::types::post_id::PostId;

    fn fetcher() -> PaginatedFetcher {
        // Unroutable base: any request reaching the network would error.
        let client = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
        PaginatedFetcher::new(client, PostId::try_from(42).unwrap())
    }

    #[tokio::test]
    async fn load_is_a_noop_once_exhausted() {
        let mut pages = fetcher();
        pages.feed_mut().merge_page(CommentPage {
            items: Vec::new(),
            total: 0,
        });
        // Short-circuits before building a request, so the dead endpoint is
        // never contacted.
        assert!(!pages.load().await.unwrap());
        assert_eq!(pages.feed().len(), 0);
    }

    #[tokio::test]
    async fn failed_load_keeps_cursor_and_clears_loading() {
        let mut pages = fetcher();
        assert!(pages.load().await.is_err());
        assert!(!pages.loading());
        assert!(pages.feed().has_more());
        assert!(pages.feed().is_empty());
    }
}
