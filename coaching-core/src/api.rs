//! Boundaries the page talks to. Handles are passed into
//! [`CoachingPage`](crate::page::CoachingPage) explicitly.

use crate::application::{Application, ApplicationId, NewApplication};
use crate::error::RemoteError;
use crate::session::{Provider, Session};
use futures::stream::LocalBoxStream;

#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    /// `Ok(None)` when nobody is signed in.
    async fn current_session(&self) -> Result<Option<Session>, RemoteError>;

    async fn providers(&self) -> Result<Vec<Provider>, RemoteError>;

    /// Starts the redirect-based sign-in for `provider_id`.
    async fn sign_in(&self, provider_id: &str) -> Result<(), RemoteError>;

    async fn sign_out(&self) -> Result<(), RemoteError>;
}

#[allow(async_fn_in_trait)]
pub trait ApplicationsApi {
    /// Applications whose `user` equals `user`, in backend order.
    async fn list(&self, user: &str) -> Result<Vec<Application>, RemoteError>;

    async fn create(&self, new: &NewApplication) -> Result<Application, RemoteError>;

    /// Returns the deleted row.
    async fn delete(&self, id: &ApplicationId) -> Result<Application, RemoteError>;
}

/// Live variant of [`ApplicationsApi::list`]: every item is a full snapshot.
/// Streams are not `Send` so browser transports can back them.
pub trait ApplicationFeed {
    fn watch(&self, user: &str) -> LocalBoxStream<'static, Result<Vec<Application>, RemoteError>>;
}
