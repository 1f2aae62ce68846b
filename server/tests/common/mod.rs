//! Router-level test harness over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use spacer_server::auth::{Principal, TokenKeys, TokenKind};
use spacer_server::config::Config;
use spacer_server::mailer::LogMailer;
use spacer_server::models::user::NewUser;
use spacer_server::models::{Role, User};
use spacer_server::repository::Repositories;
use spacer_server::routes::create_routes;
use spacer_server::state::AppState;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct Actor {
    pub user: User,
    pub token: String,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_verification(false)
    }

    pub fn with_verification(require_verified_email: bool) -> Self {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("integration-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(
            Repositories::in_memory(),
            TokenKeys::new(
                &config.auth.jwt_secret,
                Duration::minutes(15),
                Duration::days(1),
            ),
            Arc::new(LogMailer),
            require_verified_email,
        );
        let router = create_routes(state.clone(), &config);
        Self { state, router }
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Inserts an account straight into the store and mints it an access
    /// token, skipping password hashing.
    pub async fn actor(&self, email: &str, role: Role) -> Actor {
        let user = self
            .state
            .users
            .create(NewUser {
                email: email.to_string(),
                password_hash: "unused".to_string(),
                first_name: "Test".to_string(),
                last_name: role.to_string(),
                role,
                is_verified: true,
                verification_token: None,
            })
            .await
            .unwrap();
        let token = self
            .state
            .tokens
            .issue(&Principal::from(&user), TokenKind::Access)
            .unwrap();
        Actor { user, token }
    }

    pub async fn create_space(&self, owner: &Actor, per_hour: i64, per_day: i64) -> Value {
        let reply = self
            .post("/spaces", Some(&owner.token), space_payload("Nairobi", per_hour, per_day))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.data().clone()
    }

    pub async fn book(&self, client: &Actor, space_id: &str, start: &str, end: &str) -> Reply {
        self.post(
            "/bookings",
            Some(&client.token),
            json!({ "space_id": space_id, "start_time": start, "end_time": end }),
        )
        .await
    }
}

pub fn space_payload(city: &str, per_hour: i64, per_day: i64) -> Value {
    json!({
        "name": "Garden studio",
        "description": "Quiet room with a view",
        "address": "12 Acacia Ave",
        "city": city,
        "state": "Nairobi County",
        "country": "Kenya",
        "postal_code": "00100",
        "type": "studio",
        "capacity": 8,
        "price_per_hour": per_hour,
        "price_per_day": per_day,
        "amenities": ["wifi", "whiteboard"]
    })
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
