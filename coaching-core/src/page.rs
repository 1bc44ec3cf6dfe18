use crate::api::{ApplicationsApi, SessionProvider};
use crate::application::{Application, ApplicationId};
use crate::error::RemoteError;
use crate::view::{CoachingView, Screen};
use futures::{Stream, StreamExt};
use std::cell::{Ref, RefCell, RefMut};
use tracing::{debug, info, warn};

/// What a mutation does to the list once it succeeds. The local mirror is
/// always patched first; `Refetch` then re-runs the list query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    #[default]
    Patch,
    Refetch,
}

/// Where the [`CoachingView`] lives. Front ends keep it in their reactive
/// store; native callers use a plain `RefCell`.
pub trait ViewHost {
    /// Runs `f` against the view. `None` once the view has been torn down.
    fn update<R>(&self, f: impl FnOnce(&mut CoachingView) -> R) -> Option<R>;
}

impl ViewHost for RefCell<CoachingView> {
    fn update<R>(&self, f: impl FnOnce(&mut CoachingView) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

/// Drives a [`CoachingView`] against live boundaries. The view is only
/// touched between awaits, never across one, so renders can read it while a
/// request is in flight.
pub struct CoachingPage<S, A, H = RefCell<CoachingView>> {
    sessions: S,
    api: A,
    policy: RefreshPolicy,
    host: H,
}

impl<S, A> CoachingPage<S, A>
where
    S: SessionProvider,
    A: ApplicationsApi,
{
    pub fn new(sessions: S, api: A, policy: RefreshPolicy) -> Self {
        Self::with_host(sessions, api, policy, RefCell::new(CoachingView::new()))
    }

    pub fn view(&self) -> Ref<'_, CoachingView> {
        self.host.borrow()
    }

    pub fn view_mut(&self) -> RefMut<'_, CoachingView> {
        self.host.borrow_mut()
    }

    pub fn render(&self) -> Screen {
        self.host.borrow().render()
    }
}

impl<S, A, H> CoachingPage<S, A, H>
where
    S: SessionProvider,
    A: ApplicationsApi,
    H: ViewHost,
{
    pub fn with_host(sessions: S, api: A, policy: RefreshPolicy, host: H) -> Self {
        Self {
            sessions,
            api,
            policy,
            host,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Returns true when a session was found and the list was requested.
    pub async fn mount(&self) -> bool {
        match self.sessions.providers().await {
            Ok(providers) => {
                self.host.update(|v| v.set_providers(providers));
            }
            Err(err) => warn!(error = %err, "provider list unavailable"),
        }

        let outcome = self.sessions.current_session().await;
        if self.host.update(|v| v.resolve_session(outcome)) == Some(true) {
            self.refresh().await;
            return true;
        }
        false
    }

    pub async fn refresh(&self) {
        let Some(Some(identity)) = self.host.update(CoachingView::begin_load) else {
            return;
        };
        let outcome = self.api.list(&identity).await;
        self.host.update(|v| v.finish_load(outcome));
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.host.update(|v| v.set_draft(text));
    }

    /// Returns true when the application was created.
    pub async fn submit(&self) -> bool {
        let new = match self.host.update(CoachingView::begin_submit) {
            Some(Ok(new)) => new,
            Some(Err(err)) => {
                debug!(error = %err, "submit ignored");
                return false;
            }
            None => return false,
        };

        let outcome = self.api.create(&new).await;
        let created = outcome.is_ok();
        if let Ok(app) = &outcome {
            info!(id = %app.id, "application submitted");
        }
        self.host.update(|v| v.finish_submit(outcome));

        if created && self.policy == RefreshPolicy::Refetch {
            self.refresh().await;
        }
        created
    }

    /// Returns true when the application was deleted.
    pub async fn delete(&self, id: &ApplicationId) -> bool {
        let Some(Some(id)) = self.host.update(|v| v.begin_delete(id)) else {
            return false;
        };

        let outcome = self.api.delete(&id).await;
        let deleted = outcome.is_ok();
        self.host.update(|v| v.finish_delete(&id, outcome));

        if deleted && self.policy == RefreshPolicy::Refetch {
            self.refresh().await;
        }
        deleted
    }

    pub async fn sign_in(&self, provider_id: &str) {
        if let Err(err) = self.sessions.sign_in(provider_id).await {
            warn!(provider = provider_id, error = %err, "sign-in redirect failed");
        }
    }

    pub async fn sign_out(&self) {
        if let Err(err) = self.sessions.sign_out().await {
            warn!(error = %err, "sign-out failed");
        }
        self.host.update(CoachingView::sign_out);
    }

    pub fn apply_snapshot(&self, outcome: Result<Vec<Application>, RemoteError>) {
        self.host.update(|v| v.apply_snapshot(outcome));
    }

    /// Applies snapshots from a live feed until it ends, the session goes
    /// away, or the view is torn down.
    pub async fn follow<St>(&self, mut updates: St)
    where
        St: Stream<Item = Result<Vec<Application>, RemoteError>> + Unpin,
    {
        while let Some(snapshot) = updates.next().await {
            let signed_in = self.host.update(|v| {
                v.apply_snapshot(snapshot);
                v.session().is_some()
            });
            if signed_in != Some(true) {
                debug!("feed stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryApplications, InMemorySessions};
    use crate::session::Session;
    use futures::stream;
    use std::cell::Cell;

    /// A host that can be torn down mid-flight, like an unmounted component.
    struct Detachable {
        view: RefCell<CoachingView>,
        alive: Cell<bool>,
    }

    impl ViewHost for Detachable {
        fn update<R>(&self, f: impl FnOnce(&mut CoachingView) -> R) -> Option<R> {
            self.alive.get().then(|| f(&mut self.view.borrow_mut()))
        }
    }

    fn row(id: i64, description: &str) -> Application {
        Application {
            id: id.into(),
            user: Some("Ada".into()),
            description: description.into(),
        }
    }

    #[tokio::test]
    async fn torn_down_host_stops_every_step() {
        let api = InMemoryApplications::new();
        let host = Detachable {
            view: RefCell::new(CoachingView::new()),
            alive: Cell::new(false),
        };
        let page = CoachingPage::with_host(
            InMemorySessions::signed_in(Session::new("Ada")),
            api.clone(),
            RefreshPolicy::Patch,
            host,
        );

        assert!(!page.mount().await);
        page.set_draft("feeling stuck");
        assert!(!page.submit().await);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn follow_stops_after_sign_out() {
        let page = CoachingPage::new(
            InMemorySessions::signed_in(Session::new("Ada")),
            InMemoryApplications::new(),
            RefreshPolicy::Patch,
        );
        assert!(page.mount().await);

        let feed = stream::iter(vec![Ok(vec![row(1, "a")]), Ok(vec![row(2, "b")])]);
        page.view_mut().sign_out();
        page.follow(feed).await;
        assert!(page.view().applications().is_empty());

        page.host().update(|v| v.resolve_session(Ok(Some(Session::new("Ada")))));
        page.follow(stream::iter(vec![Ok(vec![row(3, "c")])])).await;
        assert_eq!(page.view().applications()[0].description, "c");
    }

    #[test]
    fn default_policy_patches() {
        let page = CoachingPage::new(
            InMemorySessions::signed_out(),
            InMemoryApplications::new(),
            RefreshPolicy::default(),
        );
        assert_eq!(page.policy(), RefreshPolicy::Patch);
        assert_eq!(page.render(), Screen::Resolving);
    }
}
