//! # dashpub-client
//!
//! Blocking HTTP client for the hosted platform's account API (stack
//! enumeration, temporary service accounts) and per-stack HTTP API (folders,
//! datasources, dashboards).
//!
//! The publisher engine only sees the [`CloudApi`] and [`StackSession`]
//! traits; [`CloudClient`] and [`StackClient`] are the production
//! implementations.

pub mod api;
pub mod cloud;
pub mod error;
mod http;
pub mod stack;

pub use api::{CloudApi, StackSession};
pub use cloud::{cloud_token, CloudClient, ServiceAccount, Token, CLOUD_TOKEN_ENV};
pub use error::ClientError;
pub use stack::StackClient;
