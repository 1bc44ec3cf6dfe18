use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque row id. The backend may hand it out as a JSON string or integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a mutation variable for a key of GraphQL type `key_type`.
    /// Only integer key types turn digits into a JSON number; `"007"` under a
    /// `String!` or `uuid!` key is sent verbatim.
    pub fn to_variable(&self, key_type: &str) -> serde_json::Value {
        if is_integer_key(key_type) {
            if let Ok(n) = self.0.parse::<i64>() {
                return serde_json::Value::from(n);
            }
        }
        serde_json::Value::from(self.0.clone())
    }
}

fn is_integer_key(key_type: &str) -> bool {
    let scalar = key_type.trim().trim_end_matches('!');
    ["Int", "int", "bigint", "smallint", "integer", "Int64", "BigInt"].contains(&scalar)
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ApplicationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub description: String,
}

impl Application {
    /// Nothing past submission is tracked client side, so every stored
    /// application is awaiting a coach.
    pub fn status(&self) -> ApplicationStatus {
        ApplicationStatus::Pending
    }

    /// Display-side ownership check only. The backend must enforce access.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.user.as_deref().map_or(true, |user| user == identity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub user: String,
    pub description: String,
}
