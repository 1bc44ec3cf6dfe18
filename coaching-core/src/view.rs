//! Sans-IO view controller.
//!
//! Every remote interaction is split in two: a `begin_*` call that updates
//! local state and returns the request to issue (or `None` when nothing
//! should go out), and a `finish_*` call that consumes the outcome. Front
//! ends either render the whole [`Screen`] or, when they re-render parts
//! independently, the per-part views (`form_view`, `list_view`, `toast`).

use crate::application::{Application, ApplicationId, NewApplication};
use crate::error::{FormError, RemoteError};
use crate::form::{FormState, FormView, SubmissionForm};
use crate::list::{ApplicationList, ListView};
use crate::session::{Provider, Session, SessionGate};
use std::time::Duration;
use tracing::{debug, warn};

pub const SUCCESS_MESSAGE: &str = "Success! Your coach will reach out to you soon.";
pub const TOAST_DURATION: Duration = Duration::from_secs(6);
pub const LOGOUT_LABEL: &str = "Logout";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Only an indeterminate progress bar.
    Resolving,
    SignedOut(SignedOutView),
    SignedIn(SignedInView),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedOutView {
    pub login: Vec<LoginTrigger>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginTrigger {
    pub provider_id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedInView {
    pub identity: String,
    pub avatar_url: Option<String>,
    pub logout_label: &'static str,
    pub form: FormView,
    pub list: ListView,
    pub toast: Option<&'static str>,
}

impl Screen {
    pub fn submit_control(&self) -> Option<&FormView> {
        match self {
            Screen::SignedIn(view) => Some(&view.form),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CoachingView {
    gate: SessionGate,
    providers: Vec<Provider>,
    list: ApplicationList,
    form: SubmissionForm,
    toast_visible: bool,
    toast_generation: u64,
    alert: Option<String>,
}

impl CoachingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn session(&self) -> Option<&Session> {
        self.gate.current_session()
    }

    pub fn is_resolving(&self) -> bool {
        self.gate.is_resolving()
    }

    pub fn applications(&self) -> &[Application] {
        self.list.items()
    }

    pub fn form_state(&self) -> FormState {
        self.form.state()
    }

    pub fn toast_visible(&self) -> bool {
        self.toast_visible
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Hands the pending alert to the front end exactly once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn set_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers;
    }

    /// Ends session resolution. A failed lookup degrades to signed out.
    /// Returns true when the caller should load the list.
    pub fn resolve_session(&mut self, outcome: Result<Option<Session>, RemoteError>) -> bool {
        let session = match outcome {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "session lookup failed, continuing signed out");
                None
            }
        };
        self.gate.resolve(session);
        self.gate.current_session().is_some()
    }

    pub fn sign_out(&mut self) {
        self.gate.sign_out();
        self.list.clear();
        self.form.reset();
        self.toast_visible = false;
    }

    /// Returns the identity to load applications for.
    pub fn begin_load(&mut self) -> Option<String> {
        let identity = self.gate.current_session()?.identity.clone();
        self.list.begin_load();
        Some(identity)
    }

    pub fn finish_load(&mut self, outcome: Result<Vec<Application>, RemoteError>) {
        match outcome {
            Ok(items) => {
                debug!(count = items.len(), "applications loaded");
                let items = self.owned(items);
                self.list.finish_load(Some(items));
            }
            Err(err) => {
                self.list.finish_load(None);
                self.raise(err);
            }
        }
    }

    /// A pushed snapshot from a live subscription.
    pub fn apply_snapshot(&mut self, outcome: Result<Vec<Application>, RemoteError>) {
        if self.gate.current_session().is_none() {
            return;
        }
        match outcome {
            Ok(items) => {
                let items = self.owned(items);
                self.list.replace(items);
            }
            Err(err) => self.raise(err),
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.form.set_draft(text);
        if self.form.state() != FormState::Submitted {
            self.toast_visible = false;
        }
    }

    pub fn begin_submit(&mut self) -> Result<NewApplication, FormError> {
        let Some(session) = self.gate.current_session() else {
            return Err(FormError::SignedOut);
        };
        let identity = session.identity.clone();
        self.form.begin_submit(&identity)
    }

    pub fn finish_submit(&mut self, outcome: Result<Application, RemoteError>) {
        match outcome {
            Ok(created) => {
                self.form.finish_submit(true);
                self.list.insert(created);
                self.toast_visible = true;
                self.toast_generation += 1;
            }
            Err(err) => {
                self.form.finish_submit(false);
                self.raise(err);
            }
        }
    }

    /// `None` when the id is not on screen: nothing to delete locally and
    /// no mutation goes out.
    pub fn begin_delete(&mut self, id: &ApplicationId) -> Option<ApplicationId> {
        self.gate.current_session()?;
        if !self.list.contains(id) {
            debug!(%id, "delete ignored, application not in list");
            return None;
        }
        self.list.mark_deleting(id, true);
        Some(id.clone())
    }

    pub fn finish_delete(&mut self, id: &ApplicationId, outcome: Result<Application, RemoteError>) {
        match outcome {
            Ok(_) => {
                self.list.remove(id);
            }
            Err(err) => {
                self.list.mark_deleting(id, false);
                self.raise(err);
            }
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.toast_visible = false;
    }

    /// Identifies the toast currently on screen; bumped by every successful
    /// submit.
    pub fn toast_generation(&self) -> u64 {
        self.toast_generation
    }

    /// Timer-driven dismissal. A timer started for an older toast leaves a
    /// newer one alone.
    pub fn expire_toast(&mut self, generation: u64) {
        if generation == self.toast_generation {
            self.toast_visible = false;
        }
    }

    pub fn login_triggers(&self) -> Vec<LoginTrigger> {
        self.providers
            .iter()
            .map(|p| LoginTrigger {
                provider_id: p.id.clone(),
                label: format!("Login with {}", p.name),
            })
            .collect()
    }

    pub fn form_view(&self) -> FormView {
        self.form.render()
    }

    pub fn list_view(&self) -> ListView {
        self.list.render()
    }

    pub fn toast(&self) -> Option<&'static str> {
        self.toast_visible.then_some(SUCCESS_MESSAGE)
    }

    pub fn render(&self) -> Screen {
        match &self.gate {
            SessionGate::Resolving => Screen::Resolving,
            SessionGate::Anonymous => Screen::SignedOut(SignedOutView {
                login: self.login_triggers(),
            }),
            SessionGate::Authenticated(session) => Screen::SignedIn(SignedInView {
                identity: session.identity.clone(),
                avatar_url: session.avatar_url.clone(),
                logout_label: LOGOUT_LABEL,
                form: self.form_view(),
                list: self.list_view(),
                toast: self.toast(),
            }),
        }
    }

    fn owned(&self, items: Vec<Application>) -> Vec<Application> {
        let Some(session) = self.gate.current_session() else {
            return items;
        };
        items
            .into_iter()
            .filter(|a| a.is_owned_by(&session.identity))
            .collect()
    }

    fn raise(&mut self, err: RemoteError) {
        warn!(error = %err, "remote operation failed");
        self.alert = Some(err.to_string());
    }
}
