use crate::rng::ElectionRng;
use containers::MemberId;

/// How a member fills in a ballot inside its group.
///
/// Returning `None` abstains. Ballots naming someone outside the group are
/// discarded by the tally.
pub trait VotePolicy {
    fn ballot(&mut self, voter: &MemberId, group: &[MemberId], rng: &mut ElectionRng) -> Option<MemberId>;
}

/// Everyone votes for the first seat of the (already shuffled) group, so every
/// group reaches consensus.
#[derive(Clone, Copy, Debug, Default)]
pub struct FollowTheLeader;

impl VotePolicy for FollowTheLeader {
    fn ballot(&mut self, _voter: &MemberId, group: &[MemberId], _rng: &mut ElectionRng) -> Option<MemberId> {
        group.first().cloned()
    }
}

/// Nobody votes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Abstain;

impl VotePolicy for Abstain {
    fn ballot(&mut self, _voter: &MemberId, _group: &[MemberId], _rng: &mut ElectionRng) -> Option<MemberId> {
        None
    }
}

impl<V: VotePolicy + ?Sized> VotePolicy for Box<V> {
    fn ballot(&mut self, voter: &MemberId, group: &[MemberId], rng: &mut ElectionRng) -> Option<MemberId> {
        (**self).ballot(voter, group, rng)
    }
}
