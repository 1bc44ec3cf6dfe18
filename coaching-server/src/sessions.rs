use std::collections::HashMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use coaching_core::Session;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_MAX_AGE_DAYS: i64 = 30;
/// How long a sign-in redirect may take before its state is rejected.
pub const PENDING_LOGIN_MINUTES: i64 = 10;

#[derive(Clone, Debug)]
pub struct StoredSession {
    pub session: Session,
    pub expires: DateTime<Utc>,
}

impl StoredSession {
    pub fn expires_rfc3339(&self) -> String {
        self.expires.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

struct PendingLogin {
    provider_id: String,
    started: DateTime<Utc>,
}

/// Server-side sessions keyed by the opaque cookie token, plus the one-shot
/// `state` values of sign-ins in flight.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
    pending: RwLock<HashMap<String, PendingLogin>>,
}

impl SessionStore {
    pub async fn begin_login(&self, provider_id: &str) -> String {
        let state = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let mut pending = self.pending.write().await;
        pending.retain(|_, p| now - p.started < Duration::minutes(PENDING_LOGIN_MINUTES));
        pending.insert(
            state.clone(),
            PendingLogin {
                provider_id: provider_id.to_string(),
                started: now,
            },
        );
        state
    }

    /// Consumes `state`; true only if it was issued for `provider_id` and has
    /// not expired.
    pub async fn finish_login(&self, provider_id: &str, state: &str) -> bool {
        let Some(pending) = self.pending.write().await.remove(state) else {
            return false;
        };
        pending.provider_id == provider_id
            && Utc::now() - pending.started < Duration::minutes(PENDING_LOGIN_MINUTES)
    }

    pub async fn create(&self, session: Session) -> (String, StoredSession) {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let stored = StoredSession {
            session,
            expires: now + Duration::days(SESSION_MAX_AGE_DAYS),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires > now);
        sessions.insert(token.clone(), stored.clone());
        (token, stored)
    }

    pub async fn get(&self, token: &str) -> Option<StoredSession> {
        let stored = self.sessions.read().await.get(token).cloned()?;
        if stored.expires <= Utc::now() {
            self.sessions.write().await.remove(token);
            return None;
        }
        Some(stored)
    }

    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    async fn expire(&self, token: &str) {
        if let Some(stored) = self.sessions.write().await.get_mut(token) {
            stored.expires = Utc::now() - Duration::seconds(1);
        }
    }
}
