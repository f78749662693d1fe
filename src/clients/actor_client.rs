use crate::framework::{ActorState, StateClient};
use async_trait::async_trait;

/// Trait shared by the domain clients: one instrumented path from a typed
/// request to the actor's reply.
///
/// Implementors only expose their inner [`StateClient`]; error mapping is
/// already done by the framework, since every actor error type absorbs
/// [`FrameworkError`](crate::framework::FrameworkError).
#[async_trait]
pub trait ActorClient<S: ActorState>: Send + Sync {
    /// Access the inner generic StateClient.
    fn inner(&self) -> &StateClient<S>;

    /// Send a request and wait for the reply.
    #[tracing::instrument(skip(self))]
    async fn request(&self, request: S::Request) -> Result<S::Response, S::Error> {
        tracing::debug!("Sending request");
        self.inner().call(request).await
    }
}
