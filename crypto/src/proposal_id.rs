//! Proposal identifier derivation.
//!
//! `id = Blake2b-256(tag || field...)` where every variable-length field is
//! prefixed with its length as a little-endian u64, so `("ab", "c")` and
//! `("a", "bc")` never collide. The creation time is included when supplied;
//! omitting it yields the content-only scheme in which identical content
//! always maps to the same id.

use crate::hash::blake2b_256_multi;
use quorum_types::{Address, ProposalId, Timestamp};

const DOMAIN_TAG: &[u8] = b"quorum/proposal/v1";
const SCHEME_CONTENT_ONLY: u8 = 0;
const SCHEME_TIMESTAMPED: u8 = 1;

/// Derive the identifier of a proposal from its content.
pub fn derive_proposal_id(
    target: &Address,
    description: &str,
    payload: &[u8],
    created_at: Option<Timestamp>,
) -> ProposalId {
    let target_len = (target.as_bytes().len() as u64).to_le_bytes();
    let description_len = (description.len() as u64).to_le_bytes();
    let payload_len = (payload.len() as u64).to_le_bytes();

    let (scheme, time) = match created_at {
        Some(t) => (SCHEME_TIMESTAMPED, t.as_secs().to_le_bytes()),
        None => (SCHEME_CONTENT_ONLY, [0u8; 8]),
    };

    ProposalId::new(blake2b_256_multi(&[
        DOMAIN_TAG,
        &[scheme],
        &target_len,
        target.as_bytes(),
        &description_len,
        description.as_bytes(),
        &payload_len,
        payload,
        &time,
    ]))
}
