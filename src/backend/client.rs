//! Hosted-backend API client wrapper.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};

use crate::config::Config;
use crate::error::BackendError;
use crate::metrics;

use super::types::{FindResponse, HealthReport, SessionToken, User};

/// Client for the hosted Manifest-style backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the backend, without trailing slash.
    base_url: String,
    /// App identifier sent as `X-App-ID`.
    app_id: String,
    /// Probe attempts before giving up.
    probe_retries: u32,
    /// Bearer token for the current session, if any.
    token: Arc<RwLock<Option<String>>>,
}

/// Query builder for `find()` calls.
///
/// Serializes to the backend's query-string dialect: equality filters
/// as `{field}_eq`, relation loading as a comma-joined `relations`
/// parameter, ordering as `orderBy` plus `order=ASC|DESC`.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    filters: Vec<(String, String)>,
    relations: Vec<String>,
    order_by: Option<String>,
    descending: bool,
}

impl FindQuery {
    /// Empty query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((field.into(), value.to_string()));
        self
    }

    /// Load a related entity alongside each record.
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relations.push(relation.into());
        self
    }

    /// Order results by a field.
    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(field.into());
        self.descending = descending;
        self
    }

    /// Render the query-string pairs.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        for (field, value) in &self.filters {
            pairs.push((format!("{field}_eq"), value.clone()));
        }

        if !self.relations.is_empty() {
            pairs.push(("relations".to_string(), self.relations.join(",")));
        }

        if let Some(field) = &self.order_by {
            pairs.push(("orderBy".to_string(), field.clone()));
            pairs.push((
                "order".to_string(),
                if self.descending { "DESC" } else { "ASC" }.to_string(),
            ));
        }

        pairs
    }
}

/// Handle to one entity collection, e.g. `restaurants` or `menu-items`.
#[derive(Debug)]
pub struct Collection<'a> {
    client: &'a BackendClient,
    entity: String,
}

impl BackendClient {
    /// Create a new backend client from config with pooled HTTP settings.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_millis(2_000))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: config.backend_url_trimmed().to_string(),
            app_id: config.app_id.clone(),
            probe_retries: config.probe_retries,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the HTTP client reference.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a session token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Probe the backend's health endpoint with the configured retries.
    pub async fn probe(&self) -> Result<HealthReport, BackendError> {
        self.probe_with_retries(self.probe_retries).await
    }

    /// Probe the backend's health endpoint.
    ///
    /// Retries up to `retries` times with a linear backoff (1s per
    /// attempt already made) between failures, logging each attempt.
    #[instrument(skip(self), fields(backend = %self.base_url))]
    pub async fn probe_with_retries(&self, retries: u32) -> Result<HealthReport, BackendError> {
        let url = format!("{}/api/health", self.base_url);
        let retries = retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=retries {
            debug!(attempt, retries, "probing backend");
            metrics::inc_probe_attempts();

            match self
                .http
                .get(&url)
                .header("Content-Type", "application/json")
                .header("X-App-ID", &self.app_id)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let report: HealthReport = response
                            .json()
                            .await
                            .map_err(|e| BackendError::DecodeError(e.to_string()))?;
                        debug!(status = %report.status, "backend connection successful");
                        return Ok(report);
                    }

                    warn!(attempt, status = %status, "backend probe got non-success status");
                    metrics::inc_probe_failures();
                    if attempt == retries {
                        return Err(BackendError::Unhealthy {
                            status: status.as_u16(),
                        });
                    }
                    last_error = format!("HTTP {status}");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "backend probe attempt failed");
                    metrics::inc_probe_failures();
                    last_error = e.to_string();
                    if attempt == retries {
                        error!(
                            attempts = retries,
                            "all probe attempts failed; backend down, URL wrong, or network unreachable"
                        );
                        return Err(BackendError::Unreachable {
                            attempts: retries,
                            reason: last_error,
                        });
                    }
                }
            }

            tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
        }

        // Loop always returns on its last attempt.
        Err(BackendError::Unreachable {
            attempts: retries,
            reason: last_error,
        })
    }

    /// Open a session against an authenticable entity.
    #[instrument(skip(self, password), fields(entity = %entity, email = %email))]
    pub async fn login(
        &self,
        entity: &str,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/api/auth/{}/login", self.base_url, entity);
        let session = self.auth_request(entity, &url, email, password).await?;
        *self.token.write().await = Some(session.token);
        debug!("login successful");
        Ok(())
    }

    /// Register a new account; holds the returned session token.
    #[instrument(skip(self, password), fields(entity = %entity, email = %email))]
    pub async fn signup(
        &self,
        entity: &str,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/api/auth/{}/signup", self.base_url, entity);
        let session = self.auth_request(entity, &url, email, password).await?;
        *self.token.write().await = Some(session.token);
        debug!("signup successful");
        Ok(())
    }

    /// Drop the current session token.
    pub async fn logout(&self) {
        debug!("logging out");
        *self.token.write().await = None;
    }

    /// Fetch the authenticated principal, or fail if there is none.
    #[instrument(skip(self), fields(entity = %entity))]
    pub async fn me(&self, entity: &str) -> Result<User, BackendError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(BackendError::NotAuthenticated)?;

        let url = format!("{}/api/auth/{}/me", self.base_url, entity);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .header("X-App-ID", &self.app_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::NotAuthenticated);
        }
        if !status.is_success() {
            return Err(BackendError::RequestFailed {
                entity: entity.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }

    /// Handle to an entity collection.
    pub fn from(&self, entity: &str) -> Collection<'_> {
        debug!(entity, "accessing entity collection");
        Collection {
            client: self,
            entity: entity.to_string(),
        }
    }

    async fn auth_request(
        &self,
        entity: &str,
        url: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, BackendError> {
        let response = self
            .http
            .post(url)
            .header("X-App-ID", &self.app_id)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_else(|_| format!("HTTP {status}"));
            error!(entity, %status, "authentication failed");
            return Err(BackendError::AuthFailed {
                entity: entity.to_string(),
                reason,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }

    async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

impl Collection<'_> {
    /// Create a record in this collection.
    #[instrument(skip(self, record), fields(entity = %self.entity))]
    pub async fn create<T>(&self, record: &T) -> Result<T, BackendError>
    where
        T: Serialize + DeserializeOwned,
    {
        let url = format!("{}/api/collections/{}", self.client.base_url, self.entity);
        debug!("creating record");

        let mut request = self
            .client
            .http
            .post(&url)
            .header("X-App-ID", &self.client.app_id)
            .json(record);
        if let Some(token) = self.client.bearer().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(entity = %self.entity, %status, "create failed");
            return Err(BackendError::RequestFailed {
                entity: self.entity.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }

    /// Update a record by id with a partial patch.
    #[instrument(skip(self, patch), fields(entity = %self.entity, id))]
    pub async fn update<T>(&self, id: u64, patch: &serde_json::Value) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!(
            "{}/api/collections/{}/{}",
            self.client.base_url, self.entity, id
        );
        debug!("updating record");

        let mut request = self
            .client
            .http
            .put(&url)
            .header("X-App-ID", &self.client.app_id)
            .json(patch);
        if let Some(token) = self.client.bearer().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(entity = %self.entity, %status, "update failed");
            return Err(BackendError::RequestFailed {
                entity: self.entity.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }

    /// Run a filtered/related/ordered query over this collection.
    #[instrument(skip(self, query), fields(entity = %self.entity))]
    pub async fn find<T>(&self, query: &FindQuery) -> Result<FindResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/api/collections/{}", self.client.base_url, self.entity);
        debug!("finding records");

        let mut request = self
            .client
            .http
            .get(&url)
            .header("X-App-ID", &self.client.app_id)
            .query(&query.to_query_pairs());
        if let Some(token) = self.client.bearer().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(entity = %self.entity, %status, "find failed");
            return Err(BackendError::RequestFailed {
                entity: self.entity.clone(),
                reason: format!("HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }
}
