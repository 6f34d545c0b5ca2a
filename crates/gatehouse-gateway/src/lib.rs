//! HTTP surface for the Gatehouse challenge service.
//!
//! Routes requests into the challenge registry and the credential pool,
//! renders the interstitial page, and carries the request-freshness and
//! CORS middleware. All state is injected through [`AppState`]; the
//! binary wires a Redis or in-memory store at startup.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;

pub use app::App;
pub use config::Cli;
pub use state::{AppState, JumpSettings};
