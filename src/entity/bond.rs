//! Directed bond records between agents

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SeedCount};

/// One directed half of a bond, held by the owning agent.
///
/// The logical bond between A and B is two of these: one in A's list
/// pointing at B and one in B's list pointing at A, always with the same
/// `action_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub neighbor: AgentId,
    /// Producer/consumer hand-offs across this bond, starting at 1
    pub action_count: u64,
    pub created_at: SeedCount,
}

impl Bond {
    pub fn new(neighbor: AgentId, created_at: SeedCount) -> Self {
        Self {
            neighbor,
            action_count: 1,
            created_at,
        }
    }

    /// Seed cycles since creation
    pub fn age(&self, current: SeedCount) -> u64 {
        current.saturating_sub(self.created_at)
    }

    /// Interaction rate, decaying with age: `0.5 * actions / max(1, age)`
    pub fn strength(&self, current: SeedCount) -> f64 {
        0.5 * self.action_count as f64 / self.age(current).max(1) as f64
    }
}
