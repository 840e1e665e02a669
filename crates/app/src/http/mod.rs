pub mod router;
pub mod routes;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use store::CommentStore;

/// Shared state of the in-memory comment API. This server exists to play
/// the external-API role for demos and tests; it is not a persistence
/// layer.
#[derive(Clone)]
pub struct ServeState {
    pub store: Arc<RwLock<CommentStore>>,
    pub page_size: usize,
}

impl ServeState {
    pub fn new(page_size: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CommentStore::new())),
            page_size,
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn serve(addr: SocketAddr, state: ServeState) -> Result<(), HttpError> {
    let router = router::build(state);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
