pub mod types;
pub mod config;
pub mod sequence;
pub mod member;
pub mod election;
pub mod checkpoint;
pub mod error;
pub mod state;

pub use checkpoint::{Checkpoint, CheckpointIntegrity};
pub use config::GenesisConfig;
pub use election::{ElectionRecord, RoundRecord};
pub use error::StateError;
pub use member::{Member, Origin};
pub use sequence::Sequence;
pub use state::{ChainState, Phase};
pub use types::{Digest, MemberId};
