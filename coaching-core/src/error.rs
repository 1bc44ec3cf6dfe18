use thiserror::Error;

/// Failure of a call across the session or data boundary. `Display` is the
/// raw text shown to the user in the alert.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("{0}")]
    Validation(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("application {0} not found")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Graphql(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("description must not be empty")]
    EmptyDraft,

    #[error("a submission is already in progress")]
    Busy,

    #[error("sign in before submitting")]
    SignedOut,
}

impl From<FormError> for RemoteError {
    fn from(err: FormError) -> Self {
        RemoteError::Validation(err.to_string())
    }
}
