//! HTTP transport for the Taskboard API.

mod http;

pub use http::AuthHttpClient;
