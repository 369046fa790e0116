use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A bearer token for the next mutating backend call. Tokens may be
    /// short-lived, so this is asked per call rather than cached here.
    async fn bearer_token(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}
