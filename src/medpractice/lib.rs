//! # Medpractice Architecture
//!
//! Medpractice keeps the records of a small medical practice: patients,
//! physicians, appointments and medical notes. It is a library first. The REST
//! server and the command-line client are two thin surfaces over the same core.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Surfaces                                                   │
//! │  - server.rs + bin/server.rs: axum REST API                 │
//! │  - cli/, wired by main.rs: terminal client                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Proxy Layer (proxy.rs, remote.rs)                          │
//! │  - Same contract as the API, remote server first            │
//! │  - Falls back to a local mirror when the server is down     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the tables behind one lock                          │
//! │  - All-or-nothing mutations, persisted on every write       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, validation.rs)               │
//! │  - Pure business rules over in-memory tables                │
//! │  - Business hours, double booking, license uniqueness       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait, one JSON array per collection      │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the
//! process. Diagnostics go through `tracing`; the binaries decide where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** and **validation**: unit tests over [`store::table::Records`]
//!    built in memory. Most of the rules are pinned down here.
//! 2. **API**: mutation discipline against `InMemoryStore`, including simulated
//!    write failures, and round trips through `FileStore`.
//! 3. **Surfaces**: `tests/` drives the router with `tower::ServiceExt::oneshot`,
//!    the proxy against a live server, and the CLI binary with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: The repository facade used by every surface
//! - [`commands`]: Draft building and validation per entity
//! - [`validation`]: Scheduling, license and reference rules
//! - [`store`]: Tables, storage abstraction and implementations
//! - [`model`]: Core data types (`Patient`, `Physician`, `Appointment`, `MedicalNote`)
//! - [`server`]: REST router and error mapping
//! - [`remote`]: Blocking HTTP client for a remote server
//! - [`proxy`]: Remote-first client with local fallback
//! - [`config`]: Configuration and home directory resolution
//! - [`logging`]: `tracing` subscriber setup shared by both binaries
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the `medpractice` binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod proxy;
pub mod remote;
pub mod server;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;
