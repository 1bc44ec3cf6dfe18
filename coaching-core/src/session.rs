use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identity: String,
    pub avatar_url: Option<String>,
}

impl Session {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            avatar_url: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
}

impl Provider {
    pub fn discord() -> Self {
        Self {
            id: "discord".into(),
            name: "Discord".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionGate {
    #[default]
    Resolving,
    Anonymous,
    Authenticated(Session),
}

impl SessionGate {
    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionGate::Resolving)
    }

    pub fn current_session(&self) -> Option<&Session> {
        match self {
            SessionGate::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn resolve(&mut self, session: Option<Session>) {
        *self = match session {
            Some(session) => SessionGate::Authenticated(session),
            None => SessionGate::Anonymous,
        };
    }

    pub fn sign_out(&mut self) {
        *self = SessionGate::Anonymous;
    }
}

/// Session document as served by `/api/auth/session`. An anonymous visitor
/// gets `{}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl SessionPayload {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(session: &Session, expires: impl Into<String>) -> Self {
        Self {
            user: Some(SessionUser {
                name: Some(session.identity.clone()),
                image: session.avatar_url.clone(),
            }),
            expires: Some(expires.into()),
        }
    }

    /// A user without a usable name counts as signed out: the name is what
    /// applications are filed under.
    pub fn into_session(self) -> Option<Session> {
        let user = self.user?;
        let identity = user.name.filter(|n| !n.trim().is_empty())?;
        Some(Session {
            identity,
            avatar_url: user.image,
        })
    }
}
