use crate::error::IncompleteReason;
use crate::policy::VotePolicy;
use crate::rng::ElectionRng;
use chain::{BasisPoint, ChainConfig};
use containers::{ChainState, MemberId, RoundRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElectionParams {
    /// All members take part; otherwise a random subset opts in.
    pub use_full_member_set: bool,
    /// Upper bound on ballots processed before the election must conclude.
    pub target_participation: u64,
    /// Fail instead of recording an incomplete result.
    pub strict: bool,
}

impl ElectionParams {
    pub fn new(use_full_member_set: bool, target_participation: u64, strict: bool) -> Self {
        Self {
            use_full_member_set,
            target_participation,
            strict,
        }
    }
}

/// Everything an election produced before it was turned into a record.
#[derive(Debug, Clone)]
pub struct Tally {
    pub participants: u32,
    pub rounds: Vec<RoundRecord>,
    pub chief_delegates: Vec<MemberId>,
    pub head_chief: Option<MemberId>,
    pub votes_processed: u64,
    /// First reason the election fell short, if any.
    pub shortfall: Option<IncompleteReason>,
}

impl Tally {
    pub fn is_complete(&self) -> bool {
        self.shortfall.is_none() && self.head_chief.is_some()
    }
}

/// Picks who takes part, in registry order.
pub fn select_participants(
    state: &ChainState,
    use_full_member_set: bool,
    opt_in: BasisPoint,
    rng: &mut ElectionRng,
) -> Vec<MemberId> {
    if use_full_member_set {
        return state.members().iter().map(|m| m.id.clone()).collect();
    }

    let mut selected: Vec<MemberId> = state
        .members()
        .iter()
        .filter(|_| rng.gen_range(0..BasisPoint::MAX) < opt_in.get())
        .map(|m| m.id.clone())
        .collect();

    // A non-empty registry always fields at least one voter
    if selected.is_empty() {
        if let Some(member) = state.members().choose(rng) {
            selected.push(member.id.clone());
        }
    }
    selected
}

/// Splits `seats` into `ceil(n / max_group_size)` groups whose sizes differ
/// by at most one. Larger groups come first.
pub fn partition(seats: &[MemberId], max_group_size: usize) -> Vec<&[MemberId]> {
    if seats.is_empty() {
        return Vec::new();
    }
    let max_group_size = max_group_size.max(1);
    let group_count = seats.len().div_ceil(max_group_size);
    let base = seats.len() / group_count;
    let extra = seats.len() % group_count;

    let mut groups = Vec::with_capacity(group_count);
    let mut start = 0;
    for i in 0..group_count {
        let size = if i < extra { base + 1 } else { base };
        groups.push(&seats[start..start + size]);
        start += size;
    }
    groups
}

/// Runs rounds until a single group decides the head chief, the budget runs
/// out, or no delegates remain.
pub fn conduct<V: VotePolicy + ?Sized>(
    mut seats: Vec<MemberId>,
    config: &ChainConfig,
    target_participation: u64,
    strict: bool,
    policy: &mut V,
    rng: &mut ElectionRng,
) -> Tally {
    let participants = seats.len() as u32;
    let mut tally = Tally {
        participants,
        rounds: Vec::new(),
        chief_delegates: Vec::new(),
        head_chief: None,
        votes_processed: 0,
        shortfall: None,
    };

    if seats.is_empty() {
        tally.shortfall = Some(IncompleteReason::NoParticipants);
        return tally;
    }

    seats.shuffle(rng);

    let mut round: u32 = 0;
    loop {
        let groups = partition(&seats, config.max_group_size);
        let final_round = groups.len() == 1;
        let mut delegates = Vec::with_capacity(groups.len());
        let mut votes_cast: u32 = 0;
        let mut exhausted = false;

        'groups: for (group_index, group) in groups.iter().enumerate() {
            let mut votes: HashMap<&MemberId, usize> = HashMap::new();
            for voter in group.iter() {
                if tally.votes_processed >= target_participation {
                    exhausted = true;
                    break 'groups;
                }
                tally.votes_processed += 1;
                let Some(choice) = policy.ballot(voter, group, rng) else {
                    continue;
                };
                votes_cast += 1;
                if let Some(candidate) = group.iter().find(|seat| **seat == choice) {
                    *votes.entry(candidate).or_insert(0) += 1;
                }
            }

            let threshold = config.consensus_threshold(group.len());
            // At most one candidate can clear a two-thirds threshold
            let winner = group
                .iter()
                .find(|seat| votes.get(seat).copied().unwrap_or(0) >= threshold);
            match winner {
                Some(winner) => delegates.push(winner.clone()),
                None => {
                    tally.shortfall.get_or_insert(IncompleteReason::NoConsensus {
                        round,
                        group: group_index as u32,
                    });
                }
            }
        }

        debug!(
            round,
            seats = seats.len(),
            groups = groups.len(),
            votes_cast,
            delegates = delegates.len(),
            "Election round closed"
        );

        tally.rounds.push(RoundRecord {
            round,
            participants: seats.len() as u32,
            groups: groups.len() as u32,
            votes_cast,
            delegates: delegates.clone(),
        });

        if exhausted {
            tally.shortfall = Some(IncompleteReason::VoteBudgetExhausted);
            return tally;
        }

        if final_round {
            tally.head_chief = delegates.into_iter().next();
            tally.chief_delegates = seats;
            return tally;
        }

        if delegates.is_empty() || (strict && tally.shortfall.is_some()) {
            return tally;
        }

        seats = delegates;
        round += 1;
    }
}
