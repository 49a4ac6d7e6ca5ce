//! Token refresh hooks invoked when Wings announces `token expiring`.

use std::future::Future;

use async_trait::async_trait;

use crate::Result;
use crate::types::WebsocketCredentials;

/// Fetches fresh websocket credentials, typically by calling
/// `GET /api/client/servers/{server}/websocket` again.
///
/// Implemented for any `Fn() -> impl Future<Output = Result<WebsocketCredentials>>`.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Result<WebsocketCredentials>;
}

#[async_trait]
impl<F, Fut> TokenRefresher for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<WebsocketCredentials>> + Send,
{
    async fn refresh(&self) -> Result<WebsocketCredentials> {
        self().await
    }
}

/// Blocking counterpart of [`TokenRefresher`].
#[cfg(feature = "blocking")]
pub trait BlockingTokenRefresher {
    fn refresh(&self) -> Result<WebsocketCredentials>;
}

#[cfg(feature = "blocking")]
impl<F> BlockingTokenRefresher for F
where
    F: Fn() -> Result<WebsocketCredentials>,
{
    fn refresh(&self) -> Result<WebsocketCredentials> {
        self()
    }
}
