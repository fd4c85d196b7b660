//! Typed wrappers over the Taskboard resource endpoints.
//!
//! Every call here goes through [`crate::transport::AuthHttpClient`], so
//! token refresh and the bounded 401/403 retry have already run by the
//! time a status is mapped; what remains non-2xx becomes [`Error::Api`].

mod boards;
mod tasks;

pub use boards::BoardsApi;
pub use tasks::TasksApi;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Map a response to a typed body, or to `Error::Api` on non-2xx.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api { status, message });
    }
    response.json().await.map_err(|e| Error::Api {
        status,
        message: format!("unparseable response body: {}", e),
    })
}

/// Check a response for success, discarding the body.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<()> {
    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api { status, message });
    }
    Ok(())
}

/// Serialize a request payload, surfacing failure as an error rather
/// than panicking.
pub(crate) fn json_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::Config(format!("unserializable request body: {}", e)))
}
