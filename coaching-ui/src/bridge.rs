//! Browser-side boundaries: the auth service on the page's own origin, the
//! GraphQL endpoint, and the signal the page driver renders into.

use coaching_core::session::SessionPayload;
use coaching_core::{
    CoachingPage, CoachingView, Provider, RefreshPolicy, RemoteError, Session, SessionProvider,
    ViewHost,
};
use coaching_graphql::client::DEFAULT_ENDPOINT;
use coaching_graphql::{ClientConfig, GraphqlClient};
use leptos::{RwSignal, SignalUpdate};
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::collections::BTreeMap;
use wasm_bindgen::JsValue;

const GRAPHQL_URL: &str = match option_env!("COACHING_GRAPHQL_URL") {
    Some(url) => url,
    None => DEFAULT_ENDPOINT,
};

fn window() -> Result<web_sys::Window, RemoteError> {
    web_sys::window().ok_or_else(|| RemoteError::Network("window not available".into()))
}

fn js_error(err: JsValue) -> RemoteError {
    RemoteError::Network(format!("{err:?}"))
}

async fn call<R>(http: &reqwest::Client, method: Method, path: &str) -> Result<R, RemoteError>
where
    R: DeserializeOwned,
{
    let origin = window()?.location().origin().map_err(js_error)?;
    let response = http
        .request(method, format!("{origin}{path}"))
        .send()
        .await
        .map_err(|e| RemoteError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::Network(format!("{path} answered {status}")));
    }
    response
        .json()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct ProviderEntry {
    id: String,
    name: String,
}

#[derive(Clone, Default)]
pub struct BrowserSessions {
    http: reqwest::Client,
}

impl SessionProvider for BrowserSessions {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        let payload: SessionPayload = call(&self.http, Method::GET, "/api/auth/session").await?;
        Ok(payload.into_session())
    }

    async fn providers(&self) -> Result<Vec<Provider>, RemoteError> {
        let entries: BTreeMap<String, ProviderEntry> =
            call(&self.http, Method::GET, "/api/auth/providers").await?;
        Ok(entries
            .into_values()
            .map(|e| Provider {
                id: e.id,
                name: e.name,
            })
            .collect())
    }

    async fn sign_in(&self, provider_id: &str) -> Result<(), RemoteError> {
        window()?
            .location()
            .set_href(&format!("/api/auth/signin/{provider_id}"))
            .map_err(js_error)
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let _: IgnoredAny = call(&self.http, Method::POST, "/api/auth/signout").await?;
        Ok(())
    }
}

/// The view signal seen through the driver. Updates stop once the owning
/// component is disposed.
#[derive(Clone, Copy)]
pub struct SignalHost(pub RwSignal<CoachingView>);

impl ViewHost for SignalHost {
    fn update<R>(&self, f: impl FnOnce(&mut CoachingView) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

pub type Page = CoachingPage<BrowserSessions, GraphqlClient, SignalHost>;

/// The list is kept fresh by the polling feed, so mutations only patch.
pub fn page(view: RwSignal<CoachingView>) -> Page {
    CoachingPage::with_host(
        BrowserSessions::default(),
        GraphqlClient::new(ClientConfig::new(GRAPHQL_URL)),
        RefreshPolicy::Patch,
        SignalHost(view),
    )
}

/// Blocking `window.alert` with the raw error text.
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
