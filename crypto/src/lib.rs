//! Hashing primitives for the quorum governance engine.
//!
//! - **Blake2b-256** for content hashing
//! - Deterministic proposal identifiers derived from proposal content

pub mod hash;
pub mod proposal_id;

pub use hash::blake2b_256_multi;
pub use proposal_id::derive_proposal_id;
