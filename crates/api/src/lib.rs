//! HTTP API: session population middleware and a small demo host.
//!
//! Hosts embed [`middleware::session_middleware`] after their own
//! authentication layer; the `app` module wires a runnable notes service on
//! top of it.

pub mod app;
pub mod config;
pub mod middleware;
