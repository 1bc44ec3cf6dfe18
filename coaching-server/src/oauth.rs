//! Authorization-code flow against an OAuth2 provider.

use coaching_core::Session;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;

pub const DISCORD_AVATAR_BASE: &str = "https://cdn.discordapp.com/avatars";

#[derive(Clone, Debug)]
pub struct OAuthProvider {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
    pub scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscordProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordProfile {
    pub fn into_session(self) -> Session {
        let avatar_url = self
            .avatar
            .map(|hash| format!("{DISCORD_AVATAR_BASE}/{}/{hash}.png", self.id));
        Session {
            identity: self.username,
            avatar_url,
        }
    }
}

impl OAuthProvider {
    pub fn discord(client_id: String, client_secret: String) -> Self {
        Self {
            id: "discord".into(),
            name: "Discord".into(),
            client_id,
            client_secret,
            authorize_url: "https://discord.com/api/oauth2/authorize".into(),
            token_url: "https://discord.com/api/oauth2/token".into(),
            profile_url: "https://discord.com/api/users/@me".into(),
            scope: "identify".into(),
        }
    }

    pub fn authorization_url(&self, state: &str, redirect_uri: &str) -> Result<Url, AppError> {
        Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("bad authorize url for {}: {e}", self.id)))
    }

    /// Exchanges `code` for an access token, then reads the profile.
    pub async fn fetch_session(
        &self,
        http: &reqwest::Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Session, AppError> {
        let response = http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = match response.json::<TokenError>().await {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("token endpoint answered {status}"),
            };
            return Err(AppError::ProviderDenied(detail));
        }
        let token: TokenResponse = response.json().await?;
        debug!(provider = %self.id, "exchanged authorization code");

        let profile: DiscordProfile = http
            .get(&self.profile_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(profile.into_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_flow_parameters() {
        let provider = OAuthProvider::discord("cid".into(), "secret".into());
        let url = provider
            .authorization_url("st4te", "http://localhost:3000/api/auth/callback/discord")
            .expect("url");

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(url.as_str().starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(params.contains(&("client_id".into(), "cid".into())));
        assert!(params.contains(&("response_type".into(), "code".into())));
        assert!(params.contains(&("state".into(), "st4te".into())));
        assert!(params.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/api/auth/callback/discord".into()
        )));
    }

    #[test]
    fn profile_maps_to_session() {
        let profile: DiscordProfile =
            serde_json::from_str(r#"{"id":"80351110224678912","username":"ada","avatar":"8342729096ea3675442027381ff50dfe"}"#)
                .expect("profile");
        let session = profile.into_session();
        assert_eq!(session.identity, "ada");
        assert_eq!(
            session.avatar_url.as_deref(),
            Some("https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png")
        );

        let bare: DiscordProfile =
            serde_json::from_str(r#"{"id":"1","username":"grace","avatar":null}"#).expect("profile");
        assert_eq!(bare.into_session().avatar_url, None);
    }
}
