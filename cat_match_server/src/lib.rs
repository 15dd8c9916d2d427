//! # Cat Match server
//! This crate hosts the HTTP front end for the cat match lifecycle engine. It is responsible for:
//! * Resolving the caller's identity from the bearer token on each request.
//! * Translating requests into calls on the engine's `MatchFlowApi` and `CatApi`.
//! * Mapping engine errors onto HTTP status codes with a stable `{"error", "message"}` body.
//! * Publishing new match requests to the configured webhook.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/cat/match`: Create (`POST`) and list (`GET`) match requests.
//! * `/api/cat/match/approve`, `/api/cat/match/reject`: Decide on a received request.
//! * `/api/cat/match/{id}`: Withdraw (`DELETE`) an issued request.
//! * `/api/cat`, `/api/cat/mine`, `/api/cat/{id}`: Register, list, edit and delete your own cats.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod notifier;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
