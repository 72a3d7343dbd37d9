use containers::{ChainState, MemberId};

/// Chooses which existing member inducts the next newcomer.
pub trait InductorPolicy {
    /// Returns a member with fewer than `capacity` inductions, or `None` when
    /// every member is exhausted.
    fn select<'a>(&self, state: &'a ChainState, capacity: u32) -> Option<&'a MemberId>;
}

/// Rotates through the registry in join order.
///
/// The cursor is derived from the state (inductions so far modulo registry
/// size) so a restored checkpoint continues the rotation where it left off.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin;

impl InductorPolicy for RoundRobin {
    fn select<'a>(&self, state: &'a ChainState, capacity: u32) -> Option<&'a MemberId> {
        let members = state.members();
        if members.is_empty() {
            return None;
        }
        let start = state.induction_count() % members.len();
        (0..members.len())
            .map(|offset| &members[(start + offset) % members.len()])
            .find(|m| m.has_capacity(capacity))
            .map(|m| &m.id)
    }
}

/// Picks the member with the fewest inductions, earliest joiner first.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeastLoaded;

impl InductorPolicy for LeastLoaded {
    fn select<'a>(&self, state: &'a ChainState, capacity: u32) -> Option<&'a MemberId> {
        state
            .members()
            .iter()
            .filter(|m| m.has_capacity(capacity))
            .min_by_key(|m| (m.inductions, m.index))
            .map(|m| &m.id)
    }
}

impl<P: InductorPolicy + ?Sized> InductorPolicy for Box<P> {
    fn select<'a>(&self, state: &'a ChainState, capacity: u32) -> Option<&'a MemberId> {
        (**self).select(state, capacity)
    }
}
