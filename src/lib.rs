//! Hash-linked supplier ledger block.
//!
//! A [`Block`] binds one supplier event ([`Payload`]) to a SHA-256
//! fingerprint over its own fields and its predecessor's fingerprint.

pub mod block;
pub mod clock;
pub mod encoding;
pub mod error;
pub mod genesis;
pub mod payload;
pub mod wire;

pub use block::{derive_fingerprint, Block, Fingerprint};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LedgerError, Result};
pub use payload::{Action, Payload};
