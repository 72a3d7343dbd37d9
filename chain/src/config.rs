#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisPoint(pub u64);

impl BasisPoint {
    pub const MAX: u64 = 10_000;
    pub const fn new(value: u64) -> Option<Self> {
        if value <= Self::MAX { Some(BasisPoint(value)) } else { None }
    }
    #[inline] pub fn get(&self) -> u64 { self.0 }
}

pub const MAX_GROUP_SIZE: usize = 12;
pub const INDUCTION_CAPACITY: u32 = 12;
pub const READY_TIMEOUT_MS: u64 = 30_000;
pub const READY_POLL_INTERVAL_MS: u64 = 50;

pub const PARTIAL_PARTICIPATION_BPS: BasisPoint = match BasisPoint::new(5_000) { Some(x) => x, None => panic!() };

/// Votes a candidate needs to become the delegate of a group.
///
/// Eden requires strictly more than two thirds of the group: 3 of 3, 3 of 4,
/// 9 of 12 and so on.
pub const fn consensus_threshold(group_size: usize) -> usize {
    group_size * 2 / 3 + 1
}

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub max_group_size: usize,
    pub induction_capacity: u32,
    pub partial_participation_bps: BasisPoint,
    pub ready_timeout_ms: u64,
    pub ready_poll_interval_ms: u64,
}

impl ChainConfig {
    pub fn consensus_threshold(&self, group_size: usize) -> usize {
        consensus_threshold(group_size)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        EDEN_CONFIG
    }
}

pub const EDEN_CONFIG: ChainConfig = ChainConfig {
    max_group_size: MAX_GROUP_SIZE,
    induction_capacity: INDUCTION_CAPACITY,
    partial_participation_bps: PARTIAL_PARTICIPATION_BPS,
    ready_timeout_ms: READY_TIMEOUT_MS,
    ready_poll_interval_ms: READY_POLL_INTERVAL_MS,
};
