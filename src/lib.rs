//! Tagrelay is a first-party analytics collection proxy.
//!
//! It fronts the GA4 collection endpoints from the site's own domain so
//! that browser tracking survives third-party cookie blocking: the tag
//! script, browser hits, and Measurement Protocol events are served from
//! first-party paths and relayed upstream with scrubbed headers, while an
//! `HttpOnly` first-party identifier cookie is issued to clients that do
//! not carry one yet.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- Immutable per-process configuration resolved from
//!   flags / environment variables, with startup validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Core relay logic: route classification, header transforms,
//!   CORS policy, identity cookie handling, and upstream dispatch.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;
