use crate::{MemberId, Sequence};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Founder,
    Inducted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Position in the registry, in join order.
    pub index: u64,
    pub joined_at: Sequence,
    pub origin: Origin,
    /// Number of members this member has inducted.
    #[serde(default)]
    pub inductions: u32,
}

impl Member {
    pub fn is_founder(&self) -> bool {
        self.origin == Origin::Founder
    }

    pub fn has_capacity(&self, capacity: u32) -> bool {
        self.inductions < capacity
    }
}
