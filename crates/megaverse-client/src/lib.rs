//! # megaverse-client
//!
//! Resilient request client for the Megaverse REST API.
//!
//! Every remote call goes through [`RequestClient::execute`], which retries
//! rate-limited (HTTP 429) responses with exponential backoff and fails fast
//! on anything else. The transport sits behind [`HttpExecutor`] so tests can
//! script responses instead of touching the network.

mod client;
mod executor;
mod retry;

pub use client::RequestClient;
pub use executor::{
    HttpExecutor, HttpMethod, HttpResponse, MockExecutor, RecordedRequest, ReqwestExecutor,
};
pub use retry::RetryPolicy;
