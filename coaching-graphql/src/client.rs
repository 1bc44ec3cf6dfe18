use crate::documents;
use crate::envelope::{decode, GraphqlRequest};
use coaching_core::{Application, ApplicationId, ApplicationsApi, NewApplication, RemoteError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/v1/graphql";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    AdminSecret(String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoint: String,
    pub credential: Option<Credential>,
    /// GraphQL type of the `applications` primary key.
    pub id_type: String,
    /// How often [`ApplicationFeed::watch`](coaching_core::ApplicationFeed::watch)
    /// re-runs the list query.
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: None,
            id_type: "Int!".into(),
            poll_interval: Duration::from_secs(5),
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[derive(Deserialize)]
struct ListData {
    applications: Vec<Application>,
}

#[derive(Deserialize)]
struct InsertData {
    insert_applications_one: Option<Application>,
}

#[derive(Deserialize)]
struct DeleteData {
    delete_applications_by_pk: Option<Application>,
}

#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl GraphqlClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn execute<R: DeserializeOwned>(
        &self,
        request: &GraphqlRequest,
    ) -> Result<R, RemoteError> {
        debug!(operation = %request.operation_name, endpoint = %self.config.endpoint, "graphql request");

        let mut builder = self.http.post(&self.config.endpoint).json(request);
        builder = match &self.config.credential {
            Some(Credential::Bearer(token)) => builder.bearer_auth(token),
            Some(Credential::AdminSecret(secret)) => builder.header("x-hasura-admin-secret", secret),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized(format!("HTTP {status}")));
        }
        if !status.is_success() {
            // Some servers answer 4xx with a regular error envelope.
            return match decode::<serde_json::Value>(&body) {
                Err(err @ (RemoteError::Graphql(_) | RemoteError::Unauthorized(_))) => Err(err),
                _ => Err(RemoteError::Network(format!("HTTP {status}"))),
            };
        }
        decode(&body)
    }

    pub async fn list_applications(&self, user: &str) -> Result<Vec<Application>, RemoteError> {
        let data: ListData = self.execute(&documents::list_applications(user)).await?;
        Ok(data.applications)
    }

    pub async fn create_application(
        &self,
        new: &NewApplication,
    ) -> Result<Application, RemoteError> {
        let data: InsertData = self.execute(&documents::create_application(new)).await?;
        data.insert_applications_one
            .ok_or_else(|| RemoteError::Decode("insert returned no row".into()))
    }

    pub async fn delete_application(&self, id: &ApplicationId) -> Result<Application, RemoteError> {
        let request = documents::delete_application(id, &self.config.id_type);
        let data: DeleteData = self.execute(&request).await?;
        data.delete_applications_by_pk
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }
}

impl ApplicationsApi for GraphqlClient {
    async fn list(&self, user: &str) -> Result<Vec<Application>, RemoteError> {
        self.list_applications(user).await
    }

    async fn create(&self, new: &NewApplication) -> Result<Application, RemoteError> {
        self.create_application(new).await
    }

    async fn delete(&self, id: &ApplicationId) -> Result<Application, RemoteError> {
        self.delete_application(id).await
    }
}

/// Plain HTTP has no subscription transport, so the live list is the list
/// query re-run every `poll_interval`. The first snapshot is immediate.
impl coaching_core::ApplicationFeed for GraphqlClient {
    fn watch(
        &self,
        user: &str,
    ) -> futures::stream::LocalBoxStream<'static, Result<Vec<Application>, RemoteError>> {
        use futures::StreamExt;

        let state = (self.clone(), user.to_string(), true);
        futures::stream::unfold(state, |(client, user, first)| async move {
            if !first {
                sleep(client.config.poll_interval).await;
            }
            let snapshot = client.list_applications(&user).await;
            Some((snapshot, (client, user, false)))
        })
        .boxed_local()
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// `setTimeout` wrapped in a promise. Without a window the feed stalls
/// instead of spinning.
#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
