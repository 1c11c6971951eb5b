//! HTTP implementation of the task API
//!
//! Talks JSON to the remote service with `Authorization: Token <value>`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{AuthResponse, Registration, TaskApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::task::{Task, TaskFields, TaskFilter, TaskId};
use crate::Result;

const NO_BODY: Option<&()> = None;

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    /// The server accepts either a username or an email here
    username: &'a str,
    password: &'a str,
}

/// reqwest-backed gateway
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Url::parse(&config.api_url).map_err(|e| {
            ClientError::InvalidInput(format!("Invalid API URL '{}': {}", config.api_url, e))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InvalidInput(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    /// Send one request. Only transport failures and 401 are turned into
    /// errors here; other statuses are left to the caller.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut request = self
            .client
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ClientError::InvalidInput(format!("Failed to build request: {}", e))
            } else {
                warn!("{} {} failed: {}", method, path, e);
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        debug!("{} {} -> {}", method, path, status);

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} rejected the session token", method, path);
            return Err(ClientError::Unauthorized);
        }

        Ok(response)
    }

    async fn expect_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::failure(response).await)
        }
    }

    async fn failure(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::request_failed(status, &body)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, token, body).await?;
        let response = Self::expect_success(response).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl TaskApi for HttpGateway {
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<Registration> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        let response = self.send(Method::POST, "/register/", None, Some(&body)).await?;
        let response = Self::expect_success(response).await?;

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<Registration>(&text) {
            Ok(registration) => Ok(registration),
            Err(e) => {
                debug!("Registration body not understood ({}); treating as success", e);
                Ok(Registration::default())
            }
        }
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            username: identifier,
            password,
        };
        self.call(Method::POST, "/login/", None, Some(&body)).await
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let response = self.send(Method::POST, "/logout/", Some(token), NO_BODY).await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn list_tasks(&self, token: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        let path = format!("/tasks/{}", filter.query_string());
        self.call(Method::GET, &path, Some(token), NO_BODY).await
    }

    async fn get_task(&self, token: &str, id: TaskId) -> Result<Task> {
        let path = format!("/tasks/{}/", id);
        self.call(Method::GET, &path, Some(token), NO_BODY).await
    }

    async fn create_task(&self, token: &str, fields: &TaskFields) -> Result<Task> {
        self.call(Method::POST, "/tasks/", Some(token), Some(fields))
            .await
    }

    async fn replace_task(&self, token: &str, id: TaskId, fields: &TaskFields) -> Result<Task> {
        let path = format!("/tasks/{}/", id);
        self.call(Method::PUT, &path, Some(token), Some(fields)).await
    }

    async fn delete_task(&self, token: &str, id: TaskId) -> Result<()> {
        let path = format!("/tasks/{}/", id);
        let response = self.send(Method::DELETE, &path, Some(token), NO_BODY).await?;
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::failure(response).await)
        }
    }
}
