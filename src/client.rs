//! Main client entry point.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{BoardsApi, TasksApi};
use crate::auth::{RefreshCoordinator, SessionGate};
use crate::config::{Config, CONNECT_TIMEOUT};
use crate::error::{Error, Result};
use crate::storage::{FileScope, MemoryScope, StorageScope, TokenStore};
use crate::transport::AuthHttpClient;

/// Taskboard API client.
///
/// Wires the token store, the single-flight refresh coordinator, the
/// authenticated transport, and the session gate together. Cheap to
/// share via `Arc`; every component inside is already shared.
///
/// # Examples
///
/// ```rust,no_run
/// use taskboard_client::TaskboardClient;
///
/// # async fn example() -> taskboard_client::Result<()> {
/// let client = TaskboardClient::builder()
///     .base_url("https://api.example.com")
///     .build()
///     .await?;
///
/// let profile = client.session().login("ana@example.com", "secret").await?;
/// println!("signed in as {}", profile.name);
///
/// for board in client.boards().list().await? {
///     println!("{}", board.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TaskboardClient {
    store: Arc<TokenStore>,
    refresh: Arc<RefreshCoordinator>,
    http: Arc<AuthHttpClient>,
    gate: Arc<SessionGate>,
}

impl TaskboardClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> TaskboardClientBuilder {
        TaskboardClientBuilder::new()
    }

    /// Session operations: login, logout, current user, state.
    pub fn session(&self) -> &SessionGate {
        &self.gate
    }

    /// Typed access to board endpoints.
    pub fn boards(&self) -> BoardsApi<'_> {
        BoardsApi::new(&self.http)
    }

    /// Typed access to task endpoints.
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(&self.http)
    }

    /// The authenticated transport, for endpoints without a typed wrapper.
    pub fn http(&self) -> &AuthHttpClient {
        &self.http
    }

    /// The underlying token store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The refresh coordinator.
    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresh
    }
}

impl std::fmt::Debug for TaskboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskboardClient")
            .field("store", &self.store)
            .field("state", &self.gate.state())
            .finish()
    }
}

/// Builder for [`TaskboardClient`].
pub struct TaskboardClientBuilder {
    base_url: Option<String>,
    config: Option<Config>,
    durable: Option<Arc<dyn StorageScope>>,
    volatile: Option<Arc<dyn StorageScope>>,
    reqwest_client: Option<reqwest::Client>,
}

impl TaskboardClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            config: None,
            durable: None,
            volatile: None,
            reqwest_client: None,
        }
    }

    /// Set the API base URL. Required unless a full config is given.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Supply a full configuration, overriding `base_url` and defaults.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the durable storage scope.
    pub fn durable_scope(mut self, scope: Arc<dyn StorageScope>) -> Self {
        self.durable = Some(scope);
        self
    }

    /// Override the volatile storage scope.
    pub fn volatile_scope(mut self, scope: Arc<dyn StorageScope>) -> Self {
        self.volatile = Some(scope);
        self
    }

    /// Keep both scopes in memory - nothing persists past the process.
    pub fn in_memory(mut self) -> Self {
        self.durable = Some(Arc::new(MemoryScope::new()));
        self.volatile = Some(Arc::new(MemoryScope::new()));
        self
    }

    /// Set a custom reqwest client (useful for testing or custom TLS).
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.reqwest_client = Some(client);
        self
    }

    /// Build the client, validating the configuration.
    pub async fn build(self) -> Result<TaskboardClient> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let base_url = self
                    .base_url
                    .ok_or_else(|| Error::Config("base_url is required".into()))?;
                Config::new(base_url)
            }
        };
        config.validate()?;
        let config = Arc::new(config);

        let client = match self.reqwest_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(config.request_timeout)
                .build()
                .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?,
        };

        let durable: Arc<dyn StorageScope> = match self.durable {
            Some(scope) => scope,
            None => match FileScope::default_path() {
                Ok(scope) => Arc::new(scope),
                Err(e) => {
                    // Storage unavailability degrades, it never aborts.
                    warn!(error = %e, "No durable storage location, falling back to memory");
                    Arc::new(MemoryScope::new())
                }
            },
        };
        let volatile: Arc<dyn StorageScope> = self
            .volatile
            .unwrap_or_else(|| Arc::new(MemoryScope::new()));

        let store = Arc::new(TokenStore::new(durable, volatile));
        let refresh = Arc::new(RefreshCoordinator::new(
            client.clone(),
            Arc::clone(&config),
            Arc::clone(&store),
        ));
        let http = Arc::new(AuthHttpClient::new(
            client.clone(),
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&refresh),
        ));
        let gate = Arc::new(SessionGate::new(
            client,
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&http),
        ));
        gate.sync_state().await;

        info!(base_url = %config.base_url, "TaskboardClient initialized");
        Ok(TaskboardClient {
            store,
            refresh,
            http,
            gate,
        })
    }
}

impl Default for TaskboardClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
