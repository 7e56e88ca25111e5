//! HTTP clients for the UniMap backend services
//!
//! Implements the `um-core` port traits against the campus map REST API:
//! the node directory, the routing service, and the schedule store.

mod client;
mod config;
mod error;

pub use client::CampusApi;
pub use config::ClientConfig;
pub use error::ApiError;
