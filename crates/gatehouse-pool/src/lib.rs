//! Credential pool and call limiting for the jump flow.
//!
//! Two separate concerns live here:
//!
//! 1. [`CallLimiter`] — a fixed-window counter bounding how often the
//!    credential-rotation helper may run.
//! 2. [`CandidatePool`] — selection-with-reservation over a fixed pool of
//!    credential fingerprints, each claimable for a bounded duration via
//!    the shared expiry store.
//!
//! The [`seed`] module populates the store and the candidate file from a
//! configuration blob at startup.

pub mod clock;
pub mod credential;
pub mod error;
pub mod limiter;
pub mod pool;
pub mod seed;

pub use clock::{Clock, SystemClock};
pub use credential::Credential;
pub use error::{Error, Result};
pub use limiter::{CallLimiter, LimiterSettings};
pub use pool::CandidatePool;
pub use seed::{seed_candidates, write_candidate_file};
