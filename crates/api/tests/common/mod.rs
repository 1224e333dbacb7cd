//! Router harness over the in-memory store

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use eyantra_api::{config::Config, routes::create_router, store::Stores, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ACCESS_SECRET: &str = "test-access-secret-must-be-at-least-32-chars";
pub const REFRESH_SECRET: &str = "test-refresh-secret-must-be-at-least-32-chars";

pub fn test_config() -> Config {
    Config::with_secrets(ACCESS_SECRET, REFRESH_SECRET)
}

/// How a request presents its session
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Cookie(&'a str),
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookies: Vec<String>,
}

impl TestResponse {
    /// Value of a cookie set by this response (`Some("")` when cleared)
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.set_cookies.iter().find_map(|c| {
            c.strip_prefix(&prefix)
                .map(|rest| rest.split(';').next().unwrap_or("").to_string())
        })
    }

    /// Full `Set-Cookie` line for a cookie
    pub fn cookie_line(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}=", name);
        self.set_cookies
            .iter()
            .find(|c| c.starts_with(&prefix))
            .map(String::as_str)
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn access_token(&self) -> String {
        self.data()["accessToken"]
            .as_str()
            .expect("accessToken in body")
            .to_string()
    }

    pub fn refresh_token(&self) -> String {
        self.data()["refreshToken"]
            .as_str()
            .expect("refreshToken in body")
            .to_string()
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config, Stores::in_memory());
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            body,
            set_cookies,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match auth {
            Auth::None => builder,
            Auth::Bearer(token) => {
                builder.header(header::AUTHORIZATION, format!("Bearer {}", token))
            }
            Auth::Cookie(cookies) => builder.header(header::COOKIE, cookies),
        };
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, auth: Auth<'_>) -> TestResponse {
        self.request(Method::GET, uri, None, auth).await
    }

    pub async fn post(&self, uri: &str, body: Value, auth: Auth<'_>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), auth).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/admin/register",
            json!({ "name": name, "email": email, "password": password }),
            Auth::None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/admin/login",
            json!({ "email": email, "password": password }),
            Auth::None,
        )
        .await
    }

    /// Register an admin and return its access token
    pub async fn admin_token(&self, email: &str) -> String {
        let response = self.register("Lab Admin", email, "secret1").await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.access_token()
    }

    pub async fn create_event(&self, token: &str, title: &str, published: bool) -> Value {
        let response = self
            .post(
                "/api/events/create",
                json!({
                    "title": title,
                    "description": "<p>Bring your own bot</p>",
                    "image": "https://cdn.example.com/event.png",
                    "date": "2025-08-15",
                    "isPublished": published,
                }),
                Auth::Bearer(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.data().clone()
    }
}
