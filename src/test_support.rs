// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, routing::post, Json, Router};
use chrono::Utc;
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Map};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::auth::{Claims, DemoTokenVerifier, ExternalTokenVerifier, KeySetCache, TokenVerifier};
use crate::state::AppState;
use crate::storage::{ForumDatabase, User};

pub const TEST_KID: &str = "test-key-1";
pub const TEST_ISSUER: &str = "https://questionaura-test.us.auth0.com/";
pub const TEST_AUDIENCE: &str = "https://api.questionaura.test";
pub const TEST_DEMO_SECRET: &str = "test-demo-secret-with-at-least-32-chars";

const JWKS_JSON: &str = include_str!("../testdata/jwks.json");
const RSA_PRIVATE_PEM: &str = include_str!("../testdata/rsa_private.pem");
const RSA_OTHER_PRIVATE_PEM: &str = include_str!("../testdata/rsa_other_private.pem");

/// Key set publishing the public half of `testdata/rsa_private.pem`.
pub fn test_key_set() -> JwkSet {
    serde_json::from_str(JWKS_JSON).unwrap()
}

/// Claims a provider would issue for `sub`, valid for an hour.
pub fn test_claims(sub: &str) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        email: Some(format!("{}@example.com", sub.replace('|', "_"))),
        iss: Some(TEST_ISSUER.to_string()),
        aud: Some(json!(TEST_AUDIENCE)),
        iat: Some(now),
        demo: None,
        extra: Map::new(),
    }
}

/// RS256 token signed with the key published in [`test_key_set`].
pub fn sign_external(claims: &Claims, kid: Option<&str>) -> String {
    sign_external_with_key(claims, kid, false)
}

/// RS256 token; `foreign_key` signs with a key that is not in the key set.
pub fn sign_external_with_key(claims: &Claims, kid: Option<&str>, foreign_key: bool) -> String {
    let pem = if foreign_key {
        RSA_OTHER_PRIVATE_PEM
    } else {
        RSA_PRIVATE_PEM
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap()).unwrap()
}

pub fn sign_hs256(claims: &Claims, secret: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

/// The seeded demo account, not persisted.
pub fn demo_user() -> User {
    let now = Utc::now();
    User {
        id: 1,
        auth0_id: crate::storage::bootstrap::DEMO_USER_SUBJECT.to_string(),
        email: crate::storage::bootstrap::DEMO_USER_EMAIL.to_string(),
        username: crate::storage::bootstrap::DEMO_USER_USERNAME.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_db() -> (ForumDatabase, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = ForumDatabase::open(&dir.path().join("forum.redb")).unwrap();
    (db, dir)
}

/// Verifier whose key set is fetched from `jwks_url`.
pub fn test_verifier(jwks_url: &str) -> TokenVerifier {
    TokenVerifier::from_parts(
        DemoTokenVerifier::new(TEST_DEMO_SECRET, TEST_AUDIENCE),
        ExternalTokenVerifier::new(KeySetCache::new(jwks_url), TEST_ISSUER, TEST_AUDIENCE),
    )
}

/// App state over a fresh database, with the test key set preloaded.
pub fn test_state() -> (AppState, TempDir) {
    let (db, dir) = test_db();
    let verifier = TokenVerifier::from_parts(
        DemoTokenVerifier::new(TEST_DEMO_SECRET, TEST_AUDIENCE),
        ExternalTokenVerifier::new(
            KeySetCache::with_key_set("http://127.0.0.1:1/unused", test_key_set()),
            TEST_ISSUER,
            TEST_AUDIENCE,
        ),
    );
    (AppState::new(db, verifier), dir)
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serve `key_set` at `/.well-known/jwks.json` on an ephemeral port.
///
/// Returns the JWKS URL and a counter of requests served.
pub async fn spawn_jwks_server(key_set: JwkSet) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let key_set = Arc::new(key_set);

    let router = Router::new()
        .route(
            "/.well-known/jwks.json",
            get(
                |State((hits, key_set)): State<(Arc<AtomicUsize>, Arc<JwkSet>)>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json((*key_set).clone())
                },
            ),
        )
        .with_state((Arc::clone(&hits), key_set));

    let base = serve(router).await;
    (format!("{base}/.well-known/jwks.json"), hits)
}

/// A URL on a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/.well-known/jwks.json")
}

/// Stand-in for the Cloudinary upload API.
///
/// Records request paths. When `succeed` is false every upload fails with 500.
pub async fn spawn_media_host(succeed: bool) -> (String, Arc<Mutex<Vec<String>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));

    let router = Router::new()
        .route(
            "/v1_1/{cloud}/image/upload",
            post(
                move |State(requests): State<Arc<Mutex<Vec<String>>>>,
                      uri: axum::http::Uri| async move {
                    requests.lock().await.push(uri.path().to_string());
                    if succeed {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "secure_url": "https://res.cloudinary.test/questionaura/pic.png"
                            })),
                        )
                            .into_response()
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": {"message": "boom"}})),
                        )
                            .into_response()
                    }
                },
            ),
        )
        .with_state(Arc::clone(&requests));

    (serve(router).await, requests)
}
