use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use coaching_server::config::Config;
use coaching_server::oauth::OAuthProvider;
use coaching_server::state::State;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::HashMap;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if form.get("code").map(String::as_str) == Some("good-code")
        && form.get("client_secret").map(String::as_str) == Some("secret")
        && form.get("grant_type").map(String::as_str) == Some("authorization_code")
    {
        (
            StatusCode::OK,
            Json(json!({ "access_token": "tok", "token_type": "Bearer" })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "bad code" })),
        )
    }
}

async fn profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer tok");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({ "id": "42", "username": "ada", "avatar": "abc" })),
    )
}

async fn start() -> (String, reqwest::Client) {
    let provider_base = spawn(
        Router::new()
            .route("/oauth2/token", post(token))
            .route("/users/@me", get(profile)),
    )
    .await;

    let mut discord = OAuthProvider::discord("cid".into(), "secret".into());
    discord.authorize_url = format!("{provider_base}/oauth2/authorize");
    discord.token_url = format!("{provider_base}/oauth2/token");
    discord.profile_url = format!("{provider_base}/users/@me");

    let config = Config {
        port: 0,
        public_url: "http://localhost:3000".into(),
        static_dir: None,
        providers: vec![discord],
    };
    let base = spawn(coaching_server::router(State::new(config))).await;

    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client");
    (base, client)
}

async fn begin_signin(base: &str, client: &reqwest::Client) -> String {
    let response = client
        .get(format!("{base}/api/auth/signin/discord"))
        .send()
        .await
        .expect("signin");
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response.headers()[LOCATION].to_str().expect("location");
    let url = Url::parse(location).expect("url");
    assert!(url.path().ends_with("/oauth2/authorize"));
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state param")
}

#[tokio::test]
async fn full_sign_in_and_out() {
    let (base, client) = start().await;

    let providers: Value = client
        .get(format!("{base}/api/auth/providers"))
        .send()
        .await
        .expect("providers")
        .json()
        .await
        .expect("json");
    assert_eq!(providers["discord"]["name"], "Discord");
    assert_eq!(
        providers["discord"]["callbackUrl"],
        "http://localhost:3000/api/auth/callback/discord"
    );

    let state = begin_signin(&base, &client).await;
    let callback = client
        .get(format!("{base}/api/auth/callback/discord"))
        .query(&[("code", "good-code"), ("state", state.as_str())])
        .send()
        .await
        .expect("callback");
    assert_eq!(callback.status(), StatusCode::FOUND);
    assert_eq!(callback.headers()[LOCATION], "/");
    let set_cookie = callback.headers()[SET_COOKIE].to_str().expect("cookie").to_string();
    let cookie = set_cookie.split(';').next().expect("pair").to_string();
    assert!(cookie.starts_with("coaching.session-token="));

    let session: Value = client
        .get(format!("{base}/api/auth/session"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("session")
        .json()
        .await
        .expect("json");
    assert_eq!(session["user"]["name"], "ada");
    assert_eq!(
        session["user"]["image"],
        "https://cdn.discordapp.com/avatars/42/abc.png"
    );
    assert!(session["expires"].is_string());

    let replay = client
        .get(format!("{base}/api/auth/callback/discord"))
        .query(&[("code", "good-code"), ("state", state.as_str())])
        .send()
        .await
        .expect("replay");
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);

    let signout = client
        .post(format!("{base}/api/auth/signout"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("signout");
    assert_eq!(signout.status(), StatusCode::OK);
    assert!(signout.headers()[SET_COOKIE]
        .to_str()
        .expect("cookie")
        .contains("Max-Age=0"));

    let session: Value = client
        .get(format!("{base}/api/auth/session"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("session")
        .json()
        .await
        .expect("json");
    assert_eq!(session, json!({}));
}

#[tokio::test]
async fn rejected_code_and_unknown_provider() {
    let (base, client) = start().await;

    let unknown = client
        .get(format!("{base}/api/auth/signin/myspace"))
        .send()
        .await
        .expect("signin");
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let state = begin_signin(&base, &client).await;
    let denied = client
        .get(format!("{base}/api/auth/callback/discord"))
        .query(&[("code", "stale-code"), ("state", state.as_str())])
        .send()
        .await
        .expect("callback");
    assert_eq!(denied.status(), StatusCode::BAD_REQUEST);
    assert!(denied.text().await.expect("body").contains("bad code"));

    let anonymous: Value = client
        .get(format!("{base}/api/auth/session"))
        .send()
        .await
        .expect("session")
        .json()
        .await
        .expect("json");
    assert_eq!(anonymous, json!({}));
}
