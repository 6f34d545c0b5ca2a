//! Challenge lifecycle service.
//!
//! This crate owns the challenge state machine: deterministic token
//! derivation from a client fingerprint and target URL, and the
//! [`ChallengeRegistry`] that issues tokens, advances their status, and
//! redeems them against an [`ExpiringStore`] backend.
//!
//! # Example
//!
//! ```rust
//! use gatehouse_challenge::{ChallengeRegistry, CreateOutcome, CreateParams};
//! use gatehouse_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ChallengeRegistry::new(Arc::new(MemoryStore::new()));
//!
//! let params = CreateParams::builder().target_url("example.com").build();
//! match registry.create("203.0.113.7", params).await? {
//!     CreateOutcome::Issued(token) => {
//!         let payload = registry.begin_processing(&token).await?;
//!         assert_eq!(payload.target_url, "https://example.com");
//!         let url = registry.resolve(&token).await?;
//!         assert_eq!(url, "https://example.com");
//!     }
//!     CreateOutcome::DirectRedirect(url) => {
//!         // store was unreachable; send the caller straight through
//!         let _ = url;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ExpiringStore`]: gatehouse_core::ExpiringStore

pub mod deriver;
pub mod registry;

pub use registry::{ChallengeRegistry, CreateOutcome, CreateParams};
