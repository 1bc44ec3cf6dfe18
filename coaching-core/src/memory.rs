//! In-process stand-ins for the session provider and the data API. They back
//! the unit tests and local demos.

use crate::api::{ApplicationFeed, ApplicationsApi, SessionProvider};
use crate::application::{Application, ApplicationId, NewApplication};
use crate::error::RemoteError;
use crate::session::{Provider, Session};
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::{LocalBoxStream, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Store {
    next_id: i64,
    rows: Vec<Application>,
    watchers: Vec<(String, UnboundedSender<Result<Vec<Application>, RemoteError>>)>,
    fail_next: Option<RemoteError>,
    calls: Vec<String>,
}

impl Store {
    fn snapshot(&self, user: &str) -> Vec<Application> {
        self.rows
            .iter()
            .filter(|a| a.user.as_deref() == Some(user))
            .cloned()
            .collect()
    }

    fn notify(&mut self, user: &str) {
        let snapshot = self.snapshot(user);
        self.watchers.retain(|(watched, tx)| {
            if watched != user {
                return !tx.is_closed();
            }
            tx.unbounded_send(Ok(snapshot.clone())).is_ok()
        });
    }

    fn take_failure(&mut self, call: String) -> Result<(), RemoteError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// `applications` table kept in memory. Clones share the same rows.
#[derive(Clone, Default)]
pub struct InMemoryApplications {
    store: Arc<Mutex<Store>>,
}

impl InMemoryApplications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user: &str, description: &str) -> Application {
        let mut store = self.lock();
        store.next_id += 1;
        let row = Application {
            id: ApplicationId::from(store.next_id),
            user: Some(user.to_string()),
            description: description.to_string(),
        };
        store.rows.push(row.clone());
        store.notify(user);
        row
    }

    /// The next call of any kind fails with `err`.
    pub fn fail_next(&self, err: RemoteError) {
        self.lock().fail_next = Some(err);
    }

    pub fn rows(&self) -> Vec<Application> {
        self.lock().rows.clone()
    }

    /// Names of the calls received so far, e.g. `list:Ada`, `delete:3`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ApplicationsApi for InMemoryApplications {
    async fn list(&self, user: &str) -> Result<Vec<Application>, RemoteError> {
        let mut store = self.lock();
        store.take_failure(format!("list:{user}"))?;
        Ok(store.snapshot(user))
    }

    async fn create(&self, new: &NewApplication) -> Result<Application, RemoteError> {
        let mut store = self.lock();
        store.take_failure(format!("create:{}", new.user))?;
        store.next_id += 1;
        let row = Application {
            id: ApplicationId::from(store.next_id),
            user: Some(new.user.clone()),
            description: new.description.clone(),
        };
        store.rows.push(row.clone());
        store.notify(&new.user);
        Ok(row)
    }

    async fn delete(&self, id: &ApplicationId) -> Result<Application, RemoteError> {
        let mut store = self.lock();
        store.take_failure(format!("delete:{id}"))?;
        let Some(pos) = store.rows.iter().position(|a| &a.id == id) else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        let row = store.rows.remove(pos);
        if let Some(user) = row.user.clone() {
            store.notify(&user);
        }
        Ok(row)
    }
}

impl ApplicationFeed for InMemoryApplications {
    fn watch(&self, user: &str) -> LocalBoxStream<'static, Result<Vec<Application>, RemoteError>> {
        let (tx, rx) = mpsc::unbounded();
        let mut store = self.lock();
        let _ = tx.unbounded_send(Ok(store.snapshot(user)));
        store.watchers.push((user.to_string(), tx));
        rx.boxed_local()
    }
}

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    redirects: Vec<String>,
}

/// Session provider with a fixed roster of providers. `sign_in` records the
/// redirect instead of following it.
#[derive(Clone)]
pub struct InMemorySessions {
    providers: Vec<Provider>,
    state: Arc<Mutex<SessionState>>,
}

impl InMemorySessions {
    pub fn signed_out() -> Self {
        Self {
            providers: vec![Provider::discord()],
            state: Arc::default(),
        }
    }

    pub fn signed_in(session: Session) -> Self {
        let sessions = Self::signed_out();
        sessions.lock().session = Some(session);
        sessions
    }

    pub fn redirects(&self) -> Vec<String> {
        self.lock().redirects.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionProvider for InMemorySessions {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.lock().session.clone())
    }

    async fn providers(&self) -> Result<Vec<Provider>, RemoteError> {
        Ok(self.providers.clone())
    }

    async fn sign_in(&self, provider_id: &str) -> Result<(), RemoteError> {
        if !self.providers.iter().any(|p| p.id == provider_id) {
            return Err(RemoteError::Validation(format!(
                "unknown provider '{provider_id}'"
            )));
        }
        self.lock()
            .redirects
            .push(format!("/api/auth/signin/{provider_id}"));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.lock().session = None;
        Ok(())
    }
}
