use tokio::net::TcpListener;

use crate::http::{ServeState, router};

pub struct Fixture {
    pub base_url: String,
    pub state: ServeState,
}

/// Starts the in-memory comment api on an ephemeral port and returns its
/// base url plus a handle to the backing store for seeding and assertions.
pub async fn spawn_fixture(page_size: usize) -> Fixture {
    let state = ServeState::new(page_size);
    let app = router::build(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Fixture {
        base_url: format!("http://{addr}"),
        state,
    }
}
