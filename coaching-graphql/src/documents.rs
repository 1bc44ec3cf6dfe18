//! Operation documents against the generated CRUD resolvers.

use crate::envelope::GraphqlRequest;
use coaching_core::{ApplicationId, NewApplication};

pub const LIST_APPLICATIONS: &str = "query ListApplications($user: String!) {
  applications(where: {user: {_eq: $user}}) {
    id
    user
    description
  }
}";

pub const WATCH_APPLICATIONS: &str = "subscription WatchApplications($user: String!) {
  applications(where: {user: {_eq: $user}}) {
    id
    user
    description
  }
}";

pub const CREATE_APPLICATION: &str =
    "mutation CreateApplication($user: String!, $description: String!) {
  insert_applications_one(object: {user: $user, description: $description}) {
    id
    user
    description
  }
}";

/// `id_type` is the GraphQL type of the primary key, e.g. `Int!` or `uuid!`.
pub fn delete_application_document(id_type: &str) -> String {
    format!(
        "mutation DeleteApplication($id: {id_type}) {{
  delete_applications_by_pk(id: $id) {{
    id
    description
  }}
}}"
    )
}

pub fn list_applications(user: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "ListApplications",
        LIST_APPLICATIONS,
        serde_json::json!({ "user": user }),
    )
}

pub fn create_application(new: &NewApplication) -> GraphqlRequest {
    GraphqlRequest::new(
        "CreateApplication",
        CREATE_APPLICATION,
        serde_json::json!({
            "user": new.user,
            "description": new.description
        }),
    )
}

pub fn delete_application(id: &ApplicationId, id_type: &str) -> GraphqlRequest {
    GraphqlRequest::new(
        "DeleteApplication",
        delete_application_document(id_type),
        serde_json::json!({ "id": id.to_variable(id_type) }),
    )
}
