//! Core types and traits for the Gatehouse challenge service.
//!
//! This crate provides the shared vocabulary used by the challenge
//! registry, the candidate pool, and the store implementations: the
//! challenge token and its key derivation, the status enumeration, the
//! stored payload, and the [`ExpiringStore`] collaborator trait.

pub mod error;
pub mod payload;
pub mod status;
pub mod store;
pub mod token;

pub use error::{ChallengeError, StoreError};
pub use payload::ChallengePayload;
pub use status::ChallengeStatus;
pub use store::ExpiringStore;
pub use token::ChallengeToken;
