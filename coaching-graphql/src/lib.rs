//! GraphQL client for the `applications` table.

pub mod client;
pub mod documents;
pub mod envelope;

pub use client::{ClientConfig, Credential, GraphqlClient};
pub use envelope::{GraphqlError, GraphqlRequest, GraphqlResponse};
