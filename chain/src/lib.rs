pub mod config;

pub use config::{BasisPoint, ChainConfig, EDEN_CONFIG};
