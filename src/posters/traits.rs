// Poster lookup trait — swap-ready abstraction over the metadata service.

use async_trait::async_trait;

/// Finds a poster image URL for a title. Implementations must swallow their
/// own failures and return `None`; a missing poster never fails a request.
#[async_trait]
pub trait PosterLookup: Send + Sync {
    async fn poster_url(&self, title: &str) -> Option<String>;
}

/// Lookup used when no API key is configured. Always returns `None`.
pub struct NoPosterLookup;

#[async_trait]
impl PosterLookup for NoPosterLookup {
    async fn poster_url(&self, _title: &str) -> Option<String> {
        None
    }
}
