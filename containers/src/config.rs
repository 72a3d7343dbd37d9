use crate::MemberId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_FOUNDERS: [&str; 3] = ["egeon", "alice", "pip"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GenesisConfig {
    pub community: String,
    pub founders: Vec<MemberId>,
}

impl GenesisConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            community: "Eden".to_string(),
            founders: DEFAULT_FOUNDERS.iter().map(|name| MemberId::from(*name)).collect(),
        }
    }
}
