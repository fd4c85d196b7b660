//! # taskboard-client
//!
//! Rust client library for the Taskboard project management REST API.
//!
//! The crate's core is the client-side session lifecycle: a token store
//! spanning durable and volatile scopes, expiry decisions (including the
//! token's own `exp` claim), a single-flight refresh coordinator, an
//! authenticated transport with bounded retry on 401/403, and a session
//! gate for login/logout/current-user.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskboard_client::{Result, TaskboardClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = TaskboardClient::builder()
//!         .base_url("https://api.example.com")
//!         .build()
//!         .await?;
//!
//!     let profile = client.session().login("ana@example.com", "secret").await?;
//!     println!("signed in as {} ({})", profile.name, profile.access_level);
//!
//!     let boards = client.boards().list().await?;
//!     println!("{} boards", boards.len());
//!
//!     client.session().logout().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `keyring` - Store the durable scope in the system keyring

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod transport;

// Re-exports for ergonomic usage
pub use client::{TaskboardClient, TaskboardClientBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    AccessLevel, Board, NewBoard, NewTask, Phase, Session, TaskItem, TaskPatch, TaskStatus,
    UserProfile,
};
pub use storage::{FileScope, MemoryScope, StorageScope, TokenField, TokenStore};

pub use auth::{RefreshCoordinator, SessionGate, SessionState};
pub use transport::AuthHttpClient;

#[cfg(feature = "keyring")]
pub use storage::KeyringScope;
