//! di-agent: supplier sourcing over HTTP.
//!
//! Thin service around [`di_search`]:
//! query in → concurrent collection across the source registry → JSON list
//! or rated HTML supplier cards out.
//!
//! # Endpoints
//!
//! - `GET /` service info
//! - `GET /search_all?q=` full collection
//! - `GET /search?q=` full collection, then the small fallback subset if
//!   nothing was found
//!
//! Both search endpoints accept `format=json|html` and, for JSON,
//! `cards=true` to attach the enriched top suppliers.

pub mod config;
pub mod error;
pub mod keepalive;
pub mod present;
pub mod server;

pub use config::{AgentConfig, KeepaliveConfig};
pub use error::{AgentError, Result};
pub use keepalive::KeepAlive;
pub use server::{router, serve};
