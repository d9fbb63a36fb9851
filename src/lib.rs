//! # Book Network Client
//!
//! Client library for the Book Network lending service: typed configuration,
//! an authorizing HTTP transport, the REST service bindings and the paginated
//! screen state machines built on top of them.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;
