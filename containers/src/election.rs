use crate::{Digest, MemberId, Sequence};
use serde::{Deserialize, Serialize};

/// Outcome of one voting round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Zero-based round number.
    pub round: u32,
    pub participants: u32,
    pub groups: u32,
    pub votes_cast: u32,
    /// Group winners, in group order. Groups that failed to reach consensus
    /// contribute nothing.
    pub delegates: Vec<MemberId>,
}

/// Immutable result of one election phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionRecord {
    /// Zero-based position in the election history.
    pub index: u32,
    pub sequence: Sequence,
    pub seed: Digest,
    pub participants: u32,
    pub rounds: Vec<RoundRecord>,
    /// Members that reached the final round.
    pub chief_delegates: Vec<MemberId>,
    pub head_chief: Option<MemberId>,
    /// Ballots processed against the participation target.
    pub votes_processed: u64,
    pub complete: bool,
}

impl ElectionRecord {
    /// Ranked winner set: the head chief first, then the remaining chief
    /// delegates in seating order.
    pub fn winners(&self) -> Vec<MemberId> {
        let mut winners: Vec<MemberId> = self.head_chief.iter().cloned().collect();
        winners.extend(
            self.chief_delegates
                .iter()
                .filter(|id| Some(*id) != self.head_chief.as_ref())
                .cloned(),
        );
        winners
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }
}
