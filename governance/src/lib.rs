pub mod error;
pub mod rng;
pub mod policy;
pub mod election;
pub mod induction;
pub mod driver;

pub use driver::{EdenDriver, PhaseDriver};
pub use election::ElectionParams;
pub use error::{GovernanceError, IncompleteReason};
pub use induction::{InductorPolicy, LeastLoaded, RoundRobin};
pub use policy::{Abstain, FollowTheLeader, VotePolicy};
