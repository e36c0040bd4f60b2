//! The first block of every chain.

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::payload::{Action, Payload};

/// Predecessor fingerprint of the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";
pub const GENESIS_SUBJECT_ID: &str = "0000000000";
pub const GENESIS_SUBJECT_NAME: &str = "System Genesis";
pub const GENESIS_DETAILS: &str = "Genesis Block - start of chain";

/// The fixed synthetic payload carried by the genesis block.
pub fn genesis_payload() -> Payload {
    Payload::new(
        GENESIS_SUBJECT_ID,
        GENESIS_SUBJECT_NAME,
        Action::Init,
        0.0,
        GENESIS_DETAILS,
    )
}

impl Block {
    /// Create the genesis block stamped with the current wall-clock time.
    pub fn genesis() -> Self {
        Self::genesis_with_clock(&SystemClock)
    }

    pub fn genesis_with_clock(clock: &impl Clock) -> Self {
        Self::new_with_clock(genesis_payload(), GENESIS_PREV_HASH, 0, clock)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.prev_hash == GENESIS_PREV_HASH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{derive_fingerprint, is_fingerprint};
    use crate::clock::FixedClock;

    #[test]
    fn genesis_shape() {
        let g = Block::genesis();
        assert_eq!(g.index, 0);
        assert_eq!(g.prev_hash, "0");
        assert_eq!(g.nonce, 0);
        assert_eq!(g.data, genesis_payload());
        assert!(g.is_genesis());
        assert!(is_fingerprint(&g.hash));
        assert_eq!(
            g.hash,
            derive_fingerprint(0, g.timestamp, &genesis_payload(), "0", 0)
        );
    }

    #[test]
    fn genesis_matches_reference_vector() {
        let g = Block::genesis_with_clock(&FixedClock(1_700_000_000));
        assert_eq!(g.timestamp, 1_700_000_000);
        assert_eq!(
            g.hash,
            "ad47b62173dafdb70eb219b566d7f709f26503cf81bef9debd819216fa064b4c"
        );
    }

    #[test]
    fn genesis_payload_encoding() {
        assert_eq!(
            genesis_payload().canonical_json().unwrap(),
            r#"{"inn":"0000000000","company_name":"System Genesis","action":"INIT","rating_change":0,"details":"Genesis Block - start of chain"}"#
        );
    }

    #[test]
    fn tiny_rating_change_alters_genesis_hash() {
        let clock = FixedClock(1_700_000_000);
        let g = Block::genesis_with_clock(&clock);
        let mut data = genesis_payload();
        data.rating_delta = 0.0001;
        let h = derive_fingerprint(0, 1_700_000_000, &data, GENESIS_PREV_HASH, 0);
        assert_ne!(h, g.hash);
        assert_eq!(
            h,
            "992e8d1bcb7318c02bcf6be9a8cc061b7823bc23af05e1f40c5e04174a1f9cf8"
        );
    }

    #[test]
    fn later_block_is_not_genesis() {
        let g = Block::genesis();
        let b = Block::new(genesis_payload(), g.hash.clone(), 1);
        assert!(!b.is_genesis());
    }
}
