use crate::clock::{Clock, SystemClock};
use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// SHA-256 hash as lowercase hex string, used as the block's fingerprint.
pub type Fingerprint = String;

/// A ledger block: one supplier event linked to its predecessor by hash.
///
/// `hash` covers every other field. Changing any of them without
/// recomputing `hash` leaves a block that fails [`Block::verify`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Height in the chain.
    pub index: u64,
    /// Creation time, Unix seconds.
    pub timestamp: i64,
    pub data: Payload,
    /// Fingerprint of the previous block (`"0"` for genesis).
    pub prev_hash: Fingerprint,
    pub hash: Fingerprint,
    /// Reserved for proof-of-work; always 0.
    pub nonce: u64,
}

impl Block {
    /// Create a new block stamped with the current wall-clock time.
    pub fn new(data: Payload, prev_hash: impl Into<Fingerprint>, index: u64) -> Self {
        Self::new_with_clock(data, prev_hash, index, &SystemClock)
    }

    /// Create a new block, reading the timestamp from `clock`.
    pub fn new_with_clock(
        data: Payload,
        prev_hash: impl Into<Fingerprint>,
        index: u64,
        clock: &impl Clock,
    ) -> Self {
        Self::with_timestamp(data, prev_hash, index, clock.now())
    }

    /// Create a block with an explicit timestamp (for testing / determinism).
    pub fn with_timestamp(
        data: Payload,
        prev_hash: impl Into<Fingerprint>,
        index: u64,
        timestamp: i64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            prev_hash: prev_hash.into(),
            hash: Fingerprint::new(),
            nonce: 0,
        };
        block.hash = block.calculate_hash();
        debug!(index, timestamp, hash = %block.hash, "block created");
        block
    }

    /// Recompute the fingerprint from the current field values.
    pub fn calculate_hash(&self) -> Fingerprint {
        derive_fingerprint(
            self.index,
            self.timestamp,
            &self.data,
            &self.prev_hash,
            self.nonce,
        )
    }

    /// Verify the block's integrity.
    pub fn verify(&self) -> bool {
        self.calculate_hash() == self.hash
    }
}

/// Derive a block fingerprint from its fields.
///
/// The hashed record is the plain concatenation, with no separators, of
/// `index`, `timestamp`, the canonical payload JSON, `prev_hash` and `nonce`.
/// A payload with no JSON form contributes an empty segment.
pub fn derive_fingerprint(
    index: u64,
    timestamp: i64,
    data: &Payload,
    prev_hash: &str,
    nonce: u64,
) -> Fingerprint {
    let payload = data.canonical_json().unwrap_or_else(|e| {
        warn!(index, error = %e, "payload not encodable, hashing without it");
        String::new()
    });
    let record = format!("{}{}{}{}{}", index, timestamp, payload, prev_hash, nonce);
    compute_hash(record.as_bytes())
}

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Whether `s` has the shape of a fingerprint: 64 lowercase hex characters.
pub fn is_fingerprint(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::payload::Action;

    const T: i64 = 1_700_000_123;

    fn contract_fail() -> Payload {
        Payload::new(
            "7707083893",
            "Roga & Kopyta <LLC>",
            Action::ContractFail,
            -0.5,
            "contract #42",
        )
    }

    #[test]
    fn hash_matches_reference_vector() {
        let b = Block::with_timestamp(contract_fail(), "abc", 3, T);
        assert_eq!(
            b.hash,
            "8251cb61d3853e9021fa0c29624a4a337b5720c50b7897a7145a48c95ba56384"
        );
    }

    #[test]
    fn deterministic_with_same_inputs() {
        let b1 = Block::with_timestamp(contract_fail(), "abc", 3, T);
        let b2 = Block::new_with_clock(contract_fail(), "abc", 3, &FixedClock(T));
        assert_eq!(b1.hash, b2.hash);
        assert_eq!(
            derive_fingerprint(3, T, &contract_fail(), "abc", 0),
            b1.hash
        );
    }

    #[test]
    fn hash_is_64_lowercase_hex() {
        let b = Block::new(contract_fail(), "0", 0);
        assert!(is_fingerprint(&b.hash));
        assert_eq!(b.nonce, 0);
        assert!(b.verify());
    }

    #[test]
    fn every_payload_field_affects_hash() {
        let base = Block::with_timestamp(contract_fail(), "abc", 3, T);
        let variants: [fn(&mut Payload); 5] = [
            |p: &mut Payload| p.subject_id.push('0'),
            |p: &mut Payload| p.subject_name.push(' '),
            |p: &mut Payload| p.action = Action::RatingUpdate,
            |p: &mut Payload| p.rating_delta = -0.5001,
            |p: &mut Payload| p.details.clear(),
        ];
        for mutate in variants {
            let mut data = contract_fail();
            mutate(&mut data);
            let other = Block::with_timestamp(data, "abc", 3, T);
            assert_ne!(base.hash, other.hash);
        }
    }

    #[test]
    fn every_block_field_affects_hash() {
        let b = Block::with_timestamp(contract_fail(), "abc", 3, T);
        let h = &b.hash;
        assert_ne!(&derive_fingerprint(4, T, &b.data, "abc", 0), h);
        assert_ne!(&derive_fingerprint(3, T + 1, &b.data, "abc", 0), h);
        assert_ne!(&derive_fingerprint(3, T, &b.data, "abd", 0), h);
        assert_ne!(&derive_fingerprint(3, T, &b.data, "abc", 1), h);
    }

    #[test]
    fn tampered_block_fails_verify() {
        let mut b = Block::with_timestamp(contract_fail(), "abc", 3, T);
        assert!(b.verify());
        b.data.rating_delta = 2.0;
        assert!(!b.verify());
        b.hash = b.calculate_hash();
        assert!(b.verify());
    }

    #[test]
    fn chained_block_links_to_predecessor() {
        let clock = FixedClock(T);
        let g = Block::genesis_with_clock(&clock);
        let b1 = Block::new_with_clock(contract_fail(), g.hash.clone(), 1, &clock);
        assert_eq!(b1.prev_hash, g.hash);
        assert_eq!(b1.hash, b1.calculate_hash());

        let mut copy = b1.clone();
        copy.data.rating_delta = 0.0001;
        assert_ne!(copy.calculate_hash(), b1.hash);
    }

    #[test]
    fn non_finite_rating_hashes_without_payload() {
        let data = Payload::new("1", "x", Action::Init, f64::NAN, "");
        let b = Block::with_timestamp(data, "0", 1, 1_700_000_000);
        assert_eq!(b.hash, compute_hash(b"1170000000000"));
        assert!(b.verify());
    }

    #[test]
    fn fingerprint_shape_check() {
        assert!(is_fingerprint(&compute_hash(b"x")));
        assert!(!is_fingerprint("0"));
        assert!(!is_fingerprint(&compute_hash(b"x").to_uppercase()));
    }
}
