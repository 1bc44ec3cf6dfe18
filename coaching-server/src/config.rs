use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::error::AppError;
use crate::oauth::OAuthProvider;

pub struct Config {
    pub port: u16,
    /// Externally visible origin, used to build OAuth callback URLs.
    pub public_url: String,
    pub static_dir: Option<PathBuf>,
    pub providers: Vec<OAuthProvider>,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let public_url: String = try_load("COACHING_PUBLIC_URL", "http://localhost:3000")?;

        Ok(Self {
            port: try_load("COACHING_PORT", "3000")?,
            public_url: public_url.trim_end_matches('/').to_string(),
            static_dir: var("COACHING_STATIC_DIR").ok().map(PathBuf::from),
            providers: load_discord().into_iter().collect(),
        })
    }

    pub fn provider(&self, id: &str) -> Option<&OAuthProvider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn callback_url(&self, provider_id: &str) -> String {
        format!("{}/api/auth/callback/{provider_id}", self.public_url)
    }

    pub fn signin_url(&self, provider_id: &str) -> String {
        format!("{}/api/auth/signin/{provider_id}", self.public_url)
    }
}

fn load_discord() -> Option<OAuthProvider> {
    let (Ok(client_id), Ok(client_secret)) =
        (var("DISCORD_CLIENT_ID"), var("DISCORD_CLIENT_SECRET"))
    else {
        warn!("Discord credentials missing, sign-in disabled");
        return None;
    };

    let mut provider = OAuthProvider::discord(client_id, client_secret);
    if let Ok(url) = var("DISCORD_AUTHORIZE_URL") {
        provider.authorize_url = url;
    }
    if let Ok(url) = var("DISCORD_TOKEN_URL") {
        provider.token_url = url;
    }
    if let Ok(url) = var("DISCORD_PROFILE_URL") {
        provider.profile_url = url;
    }
    Some(provider)
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not set");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("invalid {key}: {e}"))
        })
}
