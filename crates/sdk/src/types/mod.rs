mod sale;

use std::fmt::Display;

use chrono::{DateTime, Utc};
pub use sale::*;

/// Creation index of a sale within the factory.
pub type SaleIndex = u64;

/// Instant in chain history the synchronized state is consistent with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self { block_number, block_timestamp }
    }

    pub fn block_number(&self) -> u64 { self.block_number }

    pub fn block_timestamp(&self) -> u64 { self.block_timestamp }
}

impl Display for StateInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.block_timestamp as i64, 0) {
            Some(ts) if self.block_number > 0 => {
                write!(f, "#{} @ {}", self.block_number, ts.format("%Y-%m-%d %H:%M:%S"))
            },
            Some(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "#{}", self.block_number),
        }
    }
}
