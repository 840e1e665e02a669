mod client;

pub use client::{ApiClient, ApiError, SaveResult, VIEWER_HEADER, post_iri};
