use crate::election::ElectionRecord;
use crate::error::StateError;
use crate::member::{Member, Origin};
use crate::{Digest, MemberId, Sequence};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Last governance phase applied to a chain state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Uninitialized,
    Genesis,
    Election,
    Induction,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Genesis => "genesis",
            Phase::Election => "election",
            Phase::Induction => "induction",
        };
        f.write_str(name)
    }
}

/// Governance state of the simulated chain.
///
/// Fields are private: readers go through the accessors and the phase driver
/// mutates through `begin`, `add_founder`, `add_inductee` and `push_election`,
/// each of which keeps the registry and the trust graph consistent.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainState {
    sequence: Sequence,
    phase: Phase,

    // Registry in join order
    members: Vec<Member>,

    elections: Vec<ElectionRecord>,

    // inductee -> inductor
    trust_graph: BTreeMap<MemberId, MemberId>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True until genesis has been applied.
    pub fn is_empty(&self) -> bool {
        self.phase == Phase::Uninitialized && self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn founders(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_founder())
    }

    pub fn elections(&self) -> &[ElectionRecord] {
        &self.elections
    }

    pub fn last_election(&self) -> Option<&ElectionRecord> {
        self.elections.last()
    }

    pub fn trust_graph(&self) -> &BTreeMap<MemberId, MemberId> {
        &self.trust_graph
    }

    pub fn inductor_of(&self, id: &MemberId) -> Option<&MemberId> {
        self.trust_graph.get(id)
    }

    /// Number of inductions recorded in the trust graph.
    pub fn induction_count(&self) -> usize {
        self.trust_graph.len()
    }

    /// SHA-256 over the canonical JSON encoding.
    pub fn state_root(&self) -> Digest {
        let encoded = serde_json::to_vec(self).expect("chain state is always JSON-encodable");
        Digest::hash(&encoded)
    }

    /// Advances the sequence and records `phase` as the current phase.
    pub fn begin(&mut self, phase: Phase) -> Sequence {
        self.sequence = self.sequence.next();
        self.phase = phase;
        self.sequence
    }

    pub fn add_founder(&mut self, id: MemberId) -> Result<&Member, StateError> {
        self.push_member(id, Origin::Founder)
    }

    /// Registers `id` as inducted by `inductor`, who must already be a member.
    pub fn add_inductee(&mut self, id: MemberId, inductor: &MemberId) -> Result<&Member, StateError> {
        let position = self
            .members
            .iter()
            .position(|m| &m.id == inductor)
            .ok_or_else(|| StateError::UnknownInductor {
                inductee: id.clone(),
                inductor: inductor.clone(),
            })?;
        if self.is_member(&id) {
            return Err(StateError::DuplicateMember(id));
        }

        self.members[position].inductions += 1;
        self.trust_graph.insert(id.clone(), inductor.clone());
        self.push_member(id, Origin::Inducted)
    }

    pub fn push_election(&mut self, record: ElectionRecord) -> Result<(), StateError> {
        let expected_index = self.elections.len() as u32;
        if record.index != expected_index {
            return Err(StateError::ElectionIndex {
                position: self.elections.len(),
                index: record.index,
            });
        }
        let reused = self
            .elections
            .last()
            .is_some_and(|last| last.sequence >= record.sequence);
        if reused {
            return Err(StateError::ElectionSequence {
                index: record.index,
                sequence: record.sequence,
            });
        }
        if record.sequence > self.sequence {
            return Err(StateError::FutureSequence {
                what: format!("election {}", record.index),
                at: record.sequence,
                current: self.sequence,
            });
        }
        self.elections.push(record);
        Ok(())
    }

    fn push_member(&mut self, id: MemberId, origin: Origin) -> Result<&Member, StateError> {
        if self.is_member(&id) {
            return Err(StateError::DuplicateMember(id));
        }
        let member = Member {
            id,
            index: self.members.len() as u64,
            joined_at: self.sequence,
            origin,
            inductions: 0,
        };
        self.members.push(member);
        Ok(&self.members[self.members.len() - 1])
    }

    /// Checks every structural invariant of the state.
    pub fn verify(&self) -> Result<(), StateError> {
        if self.phase == Phase::Uninitialized {
            if !self.members.is_empty() || !self.elections.is_empty() || !self.trust_graph.is_empty() {
                return Err(StateError::MissingGenesis);
            }
            return Ok(());
        }

        let mut positions: HashMap<&MemberId, u64> = HashMap::with_capacity(self.members.len());
        for (pos, member) in self.members.iter().enumerate() {
            if member.index != pos as u64 {
                return Err(StateError::RegistryOrder {
                    expected: pos as u64,
                    found: member.index,
                });
            }
            if positions.insert(&member.id, member.index).is_some() {
                return Err(StateError::DuplicateMember(member.id.clone()));
            }
            if member.joined_at > self.sequence {
                return Err(StateError::FutureSequence {
                    what: format!("member {}", member.id),
                    at: member.joined_at,
                    current: self.sequence,
                });
            }
        }

        let mut counts: HashMap<&MemberId, u32> = HashMap::new();
        for member in &self.members {
            let inductor = self.trust_graph.get(&member.id);
            match (member.origin, inductor) {
                (Origin::Founder, Some(_)) => {
                    return Err(StateError::FounderWithInductor(member.id.clone()))
                }
                (Origin::Founder, None) => {}
                (Origin::Inducted, None) => {
                    return Err(StateError::MissingInductor(member.id.clone()))
                }
                (Origin::Inducted, Some(inductor)) => {
                    let inductor_index = positions.get(inductor).copied().ok_or_else(|| {
                        StateError::UnknownInductor {
                            inductee: member.id.clone(),
                            inductor: inductor.clone(),
                        }
                    })?;
                    if inductor_index >= member.index {
                        return Err(StateError::ForwardInductor {
                            inductee: member.id.clone(),
                            inductor: inductor.clone(),
                        });
                    }
                    *counts.entry(inductor).or_insert(0) += 1;
                }
            }
        }

        if let Some(stray) = self.trust_graph.keys().find(|id| !positions.contains_key(id)) {
            return Err(StateError::UnknownInductee(stray.clone()));
        }

        for member in &self.members {
            let actual = counts.get(&member.id).copied().unwrap_or(0);
            if actual != member.inductions {
                return Err(StateError::InductionCountMismatch {
                    id: member.id.clone(),
                    recorded: member.inductions,
                    actual,
                });
            }
        }

        let mut previous: Option<Sequence> = None;
        for (position, election) in self.elections.iter().enumerate() {
            if election.index as usize != position {
                return Err(StateError::ElectionIndex {
                    position,
                    index: election.index,
                });
            }
            let regressed = previous.is_some_and(|prev| election.sequence <= prev);
            if regressed {
                return Err(StateError::ElectionSequence {
                    index: election.index,
                    sequence: election.sequence,
                });
            }
            if election.sequence > self.sequence {
                return Err(StateError::FutureSequence {
                    what: format!("election {}", election.index),
                    at: election.sequence,
                    current: self.sequence,
                });
            }
            previous = Some(election.sequence);
        }

        Ok(())
    }
}
