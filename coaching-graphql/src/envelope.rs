use coaching_core::RemoteError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub operation_name: String,
    pub query: String,
    pub variables: serde_json::Value,
}

impl GraphqlRequest {
    pub fn new(
        operation_name: impl Into<String>,
        query: impl Into<String>,
        variables: serde_json::Value,
    ) -> Self {
        Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl GraphqlError {
    fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|e| e.get("code"))
            .and_then(serde_json::Value::as_str)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl<T> GraphqlResponse<T> {
    /// Any reported error wins over partial data.
    pub fn into_result(self) -> Result<T, RemoteError> {
        if !self.errors.is_empty() {
            let denied = self
                .errors
                .iter()
                .any(|e| matches!(e.code(), Some("access-denied" | "invalid-jwt")));
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if denied {
                RemoteError::Unauthorized(message)
            } else {
                RemoteError::Graphql(message)
            });
        }
        self.data
            .ok_or_else(|| RemoteError::Decode("response carried neither data nor errors".into()))
    }
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    let envelope: GraphqlResponse<T> =
        serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))?;
    envelope.into_result()
}
