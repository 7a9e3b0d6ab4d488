//! HTTP implementation of the gateway over the kanban REST API.
//!
//! Every request carries `Content-Type: application/json`, the session's
//! bearer token when logged in, and an `X-Request-Id` correlation id.
//! Non-success statuses are mapped onto [`GatewayError`]; a 401 also
//! logs the session out.

mod endpoints;


use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;
use uuid::Uuid;

use kanban_models::{
    ApiErrorBody, BoardDetail, BoardId, Column, ColumnId, CreateColumnRequest, MoveColumnRequest,
    MoveTaskRequest, TaskDetail, TaskId, TaskSummary,
};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::BoardGateway;
use crate::session::Session;

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Gateway that talks to the REST API with `reqwest`.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    session: Session,
}

impl HttpGateway {
    /// Creates a gateway for the given config and session.
    pub fn new(config: GatewayConfig, session: Session) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    /// Creates a gateway using `KANBAN_API_URL`.
    pub fn from_env(session: Session) -> Result<Self> {
        Self::new(GatewayConfig::from_env()?, session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let response = self.send(Method::GET, url, None).await?;
        decode(response).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let response = self.send(Method::POST, url, Some(serde_json::to_value(body)?)).await?;
        decode(response).await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let response = self.send(Method::PATCH, url, Some(serde_json::to_value(body)?)).await?;
        decode(response).await
    }

    /// Sends a request whose response body is ignored.
    async fn send_unit(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        let url = self.config.endpoint(path)?;
        self.send(method, url, body).await?;
        Ok(())
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<reqwest::Response> {
        let request_id = Uuid::new_v4().to_string();
        let path = url.path().to_string();

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.session.bearer().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        debug!(method = %method, path = %path, request_id = %request_id, "Sending request");

        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, path = %path, error = %e, "Request failed to complete");
            GatewayError::from(e)
        })?;

        let status = response.status();
        trace!(status = status.as_u16(), request_id = %request_id, "Response received");
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let error_body = serde_json::from_str::<ApiErrorBody>(&raw).ok();
        let err = GatewayError::from_status(status.as_u16(), error_body, &raw);

        if matches!(err, GatewayError::Unauthorized(_)) && self.session.logout().await {
            warn!(path = %path, "Token rejected, session logged out");
        }
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            request_id = %request_id,
            error = %err,
            "Request failed"
        );
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(GatewayError::from)
}

#[async_trait]
impl BoardGateway for HttpGateway {
    async fn get_board(&self, board: BoardId) -> Result<BoardDetail> {
        self.get(&format!("boards/{board}")).await
    }

    async fn list_columns(&self, board: BoardId) -> Result<Vec<Column>> {
        self.get(&format!("boards/{board}/columns")).await
    }

    async fn list_tasks(&self, column: ColumnId) -> Result<Vec<TaskSummary>> {
        self.get(&format!("tasks/column/{column}")).await
    }

    async fn move_task(&self, task: TaskId, request: MoveTaskRequest) -> Result<TaskDetail> {
        self.patch(&format!("tasks/{task}/move"), &request).await
    }

    async fn create_column(&self, board: BoardId, request: CreateColumnRequest) -> Result<Column> {
        self.post(&format!("boards/{board}/columns"), &request).await
    }

    async fn move_column(&self, column: ColumnId, request: MoveColumnRequest) -> Result<Column> {
        self.patch(&format!("columns/{column}/move"), &request).await
    }
}
