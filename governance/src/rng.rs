//! Election randomness.
//!
//! Each election draws from a ChaCha8 stream seeded with the SHA-256 of the
//! pre-election state root and the election index, so replaying a phase
//! against an identical state reproduces the identical election.

use containers::Digest;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub type ElectionRng = ChaCha8Rng;

const SEED_DOMAIN: &[u8] = b"eden.election.v1";

pub fn election_seed(state_root: &Digest, index: u32) -> Digest {
    Digest::hash_parts(&[SEED_DOMAIN, state_root.as_bytes(), &index.to_le_bytes()])
}

pub fn election_rng(seed: &Digest) -> ElectionRng {
    ChaCha8Rng::from_seed(*seed.as_bytes())
}
